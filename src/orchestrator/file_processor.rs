//! 单个文件处理器 - 编排层
//!
//! ## 职责
//!
//! 处理一个文本文件的全部分块，是文件级别的编排器。
//!
//! ## 状态流转
//!
//! ```text
//! Pending → Chunking → Generating(i/N) → Aggregating → Written | Failed
//! ```
//!
//! 分块失败只记警告，不影响同一文件的其它分块；只要至少有一道题，
//! 文件就会被写出（部分结果）。

use crate::clients::ModelClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::loaders::file_name_of;
use crate::models::{load_text_file, QuestionSet};
use crate::orchestrator::run_context::{FileReport, FileState, RunContext};
use crate::services::{Chunker, QuestionWriter};
use crate::workflow::{ChunkCtx, ChunkFlow, ChunkStatus};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// 处理单个文本文件
///
/// # 参数
/// - `client`: 模型客户端
/// - `config`: 配置
/// - `writer`: 题目写入服务
/// - `path`: 源文件路径
/// - `file_index`: 文件索引（用于日志，从 1 开始）
/// - `run`: 运行上下文，累计 token 用量和警告
///
/// # 返回
/// 返回该文件的处理报告，状态一定是 `Written` 或 `Failed`
pub async fn process_file<C: ModelClient>(
    client: &C,
    config: &Config,
    writer: &QuestionWriter,
    path: &Path,
    file_index: usize,
    run: &mut RunContext,
) -> FileReport {
    let source_file = file_name_of(path);
    let mut report = FileReport::new(&source_file);

    log_file_start(file_index, &source_file);

    let text = match read_source(path).await {
        Ok(text) => text,
        Err(e) => {
            error!("[文件 {}] ❌ {}", file_index, e);
            run.warn(format!("{}: {}", source_file, e));
            return report.fail(e.to_string());
        }
    };

    if text.trim().is_empty() {
        warn!("[文件 {}] ⚠️ 文件内容为空，跳过", file_index);
        run.warn(format!("{}: 文件内容为空", source_file));
        return report.fail("文件内容为空");
    }

    // ========== 分块 ==========
    report.state = FileState::Chunking;
    let chunks = Chunker::new(config.question_generation.max_chunk_size).split(&source_file, &text);
    report.chunk_count = chunks.len();
    info!(
        "[文件 {}] ✂️ {} 字符，分为 {} 块",
        file_index,
        text.chars().count(),
        chunks.len()
    );

    // ========== 逐块生成 ==========
    let flow = ChunkFlow::new(client, config);
    let mut set = QuestionSet::new(&source_file, client.model_name());
    let total = chunks.len();
    let mut last_error: Option<AppError> = None;

    for chunk in &chunks {
        if run.is_interrupted() {
            warn!("[文件 {}] ⏹️ 收到中断信号，放弃该文件（不写出）", file_index);
            run.warn(format!("{}: 运行被中断，未写出", source_file));
            report.token_usage = set.token_usage_total;
            return report.fail("运行被中断");
        }

        report.state = FileState::Generating {
            current: chunk.number(),
            total,
        };
        debug!("[文件 {}] 状态: {}", file_index, report.state);

        let ctx = ChunkCtx::new(file_index, &source_file, chunk.number(), total);
        let outcome = flow.run(chunk, &ctx).await;

        set.add_usage(outcome.usage);
        run.add_usage(outcome.usage);
        run.warnings.extend(outcome.warnings);

        if outcome.error.is_some() {
            last_error = outcome.error;
        }

        match outcome.status {
            ChunkStatus::Parsed => set.extend_from_chunk(chunk.number(), outcome.questions),
            ChunkStatus::Empty | ChunkStatus::Failed => report.failed_chunks += 1,
        }
    }

    // ========== 汇总与写出 ==========
    report.state = FileState::Aggregating;
    report.question_count = set.total_questions;
    report.token_usage = set.token_usage_total;

    if set.is_empty() {
        warn!("[文件 {}] ⚠️ 没有生成任何有效题目，不写出文件", file_index);
        run.warn(format!(
            "{}: 所有 {} 个分块都没有生成有效题目",
            source_file, total
        ));
        return match last_error {
            Some(e) => report.fail(format!("没有生成有效题目（{}）", e)),
            None => report.fail("没有生成有效题目"),
        };
    }

    match persist(writer, &set).await {
        Ok(output_path) => {
            info!(
                "[文件 {}] 💾 已写出 {} 道题 → {}",
                file_index,
                set.total_questions,
                output_path.display()
            );
            report.output_path = Some(output_path);
            report.state = FileState::Written;
        }
        Err(e) => {
            error!("[文件 {}] ❌ {}", file_index, e);
            run.warn(format!("{}: {}", source_file, e));
            report.state = FileState::Failed(e.to_string());
        }
    }

    log_file_complete(file_index, &report);
    report
}

async fn read_source(path: &Path) -> AppResult<String> {
    Ok(load_text_file(path).await?)
}

async fn persist(writer: &QuestionWriter, set: &QuestionSet) -> AppResult<PathBuf> {
    Ok(writer.write(set).await?)
}

// ========== 日志辅助函数 ==========

fn log_file_start(file_index: usize, source_file: &str) {
    info!("\n{}", "─".repeat(60));
    info!("[文件 {}] 📄 开始处理: {}", file_index, source_file);
}

fn log_file_complete(file_index: usize, report: &FileReport) {
    info!(
        "[文件 {}] ✓ 完成: {} 道题，{}/{} 个分块失败 [{}]",
        file_index, report.question_count, report.failed_chunks, report.chunk_count, report.state
    );
    info!("{}", "─".repeat(60));
}
