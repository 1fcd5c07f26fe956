/// 日志工具模块
///
/// 提供日志初始化以及格式化输出的辅助函数
use crate::config::Config;
use crate::orchestrator::RunContext;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 默认级别为 `info`，可通过 `RUST_LOG` 覆盖；重复调用不会报错
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 学习题目生成");
    info!("🔧 模型: {}", config.ollama.model);
    info!("🌐 Ollama 地址: {}", config.ollama.base_url);
    info!(
        "📝 题型: {}",
        config
            .question_generation
            .question_types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    info!(
        "📊 每块题目数: {} | 分块上限: {} 字符 | 最大重试: {}",
        config.question_generation.questions_per_chunk,
        config.question_generation.max_chunk_size,
        config.question_generation.max_retries
    );
    info!("{}", "=".repeat(60));
}

/// 记录文件加载信息
pub fn log_files_loaded(total: usize, input_dir: &str) {
    info!("✓ 在 {}/ 中找到 {} 个待处理的文本文件", input_dir, total);
}

/// 打印最终统计信息
pub fn print_final_stats(run: &RunContext, elapsed: Duration, output_dir: &str) {
    let written = run.written_count();
    let failed = run.failed_count();

    info!("\n{}", "=".repeat(60));
    info!("🎓 题目生成完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));

    for report in &run.files {
        info!(
            "   📄 {} → {} 道题 ({} 个分块, 失败 {}) [{}]",
            report.source_file,
            report.question_count,
            report.chunk_count,
            report.failed_chunks,
            report.state
        );
    }

    info!("✅ 成功: {}/{}", written, run.files.len());
    info!("❌ 失败: {}", failed);
    info!("❓ 题目总数: {}", run.total_questions());
    info!("📁 输出目录: {}/", output_dir);

    info!("\n🔢 Token 用量:");
    info!("   输入 tokens: {}", run.token_usage.prompt_tokens);
    info!("   输出 tokens: {}", run.token_usage.completion_tokens);
    info!("   合计: {}", run.token_usage.total());

    if !run.warnings.is_empty() {
        info!("\n⚠️ 警告 ({} 条):", run.warnings.len());
        for warning in &run.warnings {
            warn!("   {}", warning);
        }
    }

    if run.is_interrupted() {
        warn!("⏹️ 运行被中断，未处理的文件下次运行时会重新处理");
    }

    info!("{}", "=".repeat(60));
    info!("⏱️ 耗时: {:.2} 秒", elapsed.as_secs_f64());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
