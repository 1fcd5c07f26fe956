use anyhow::{Context, Result};
use std::sync::atomic::Ordering;
use study_questions::utils::logging;
use study_questions::{App, Config};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env().context("加载配置失败")?;

    // 初始化应用（创建目录 + 检查 Ollama 连接）
    let app = App::initialize(config).await?;

    // Ctrl-C 只设置中断标志，正在进行的请求会正常结束
    let interrupt = app.interrupt_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⏹️ 收到 Ctrl-C，当前分块完成后停止");
            interrupt.store(true, Ordering::SeqCst);
        }
    });

    app.run().await?;

    Ok(())
}
