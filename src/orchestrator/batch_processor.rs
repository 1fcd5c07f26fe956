//! 批量文件处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整的批处理运行。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建目录、打印启动信息、检查 Ollama 连通性
//! 2. **批量加载**：扫描输入目录中所有 `.txt` 文件（按文件名排序）
//! 3. **顺序处理**：一次一个文件，委托 file_processor 处理
//! 4. **中断处理**：每个文件开始前检查中断标志
//! 5. **全局统计**：汇总题目数、token 用量与警告

use crate::clients::{ModelClient, OllamaClient};
use crate::config::Config;
use crate::models::list_text_files;
use crate::orchestrator::file_processor;
use crate::orchestrator::run_context::RunContext;
use crate::services::QuestionWriter;
use crate::utils::logging::{log_files_loaded, log_startup, print_final_stats};
use anyhow::{Context, Result};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// 应用主结构
pub struct App<C: ModelClient = OllamaClient> {
    config: Config,
    client: C,
    writer: QuestionWriter,
    interrupt: Arc<AtomicBool>,
}

impl App<OllamaClient> {
    /// 初始化应用
    ///
    /// 目录无法创建或 Ollama 不可达时直接返回错误
    pub async fn initialize(config: Config) -> Result<Self> {
        config
            .ensure_directories()
            .context("无法创建输入/输出目录")?;

        log_startup(&config);

        let client = OllamaClient::new(&config.ollama);
        info!("🔌 正在检查 Ollama 连接: {}", client.base_url());
        if !client.test_connection().await {
            anyhow::bail!(
                "无法连接到 Ollama ({})，请确认 `ollama serve` 已启动",
                client.base_url()
            );
        }
        info!("✓ Ollama 连接正常");

        Ok(Self::with_client(config, client))
    }
}

impl<C: ModelClient> App<C> {
    /// 使用指定的模型客户端创建应用（不做连接检查）
    pub fn with_client(config: Config, client: C) -> Self {
        let writer = QuestionWriter::new(config.question_generation.output_dir());
        Self {
            config,
            client,
            writer,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 中断标志，置为 true 后当前请求结束即停止
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunContext> {
        let started = Instant::now();
        let mut run = RunContext::with_interrupt(self.interrupt.clone());

        // 加载所有待处理的文件
        let files = self.load_files().await?;

        if files.is_empty() {
            warn!("⚠️ 没有找到待处理的文本文件，程序结束");
            return Ok(run);
        }

        log_files_loaded(files.len(), &self.config.question_generation.text_input_dir);

        for (index, path) in files.iter().enumerate() {
            if run.is_interrupted() {
                warn!("⏹️ 收到中断信号，剩余 {} 个文件未处理", files.len() - index);
                break;
            }

            let report = file_processor::process_file(
                &self.client,
                &self.config,
                &self.writer,
                path,
                index + 1,
                &mut run,
            )
            .await;
            run.files.push(report);
        }

        print_final_stats(
            &run,
            started.elapsed(),
            &self.config.question_generation.questions_output_dir,
        );

        Ok(run)
    }

    /// 扫描输入目录
    async fn load_files(&self) -> Result<Vec<std::path::PathBuf>> {
        info!("\n📁 正在扫描待处理的文本文件...");
        list_text_files(&self.config.question_generation.input_dir())
            .await
            .context("扫描输入目录失败")
    }
}
