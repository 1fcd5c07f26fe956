//! 分块处理流程 - 流程层
//!
//! 核心职责：定义"一个分块"的完整处理流程
//!
//! 流程顺序：
//! 1. 构建提示词
//! 2. 调用模型（连接失败 / 超时按原提示词重试）
//! 3. 解析并校验模型输出

use tracing::{info, warn};

use crate::clients::ModelClient;
use crate::config::{Config, ModelOptions};
use crate::error::{AppError, ModelError};
use crate::models::{GenerationRequest, ModelResponse, Question, QuestionType, TextChunk, TokenUsage};
use crate::services::{prompt_builder, response_parser};
use crate::workflow::chunk_ctx::ChunkCtx;

/// 分块处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStatus {
    /// 模型调用成功并解析出至少一道题
    Parsed,
    /// 模型调用成功但没有得到有效题目
    Empty,
    /// 模型调用失败（重试耗尽或模型错误）
    Failed,
}

/// 单个分块的产出
#[derive(Debug)]
pub struct ChunkOutcome {
    pub status: ChunkStatus,
    pub questions: Vec<Question>,
    pub usage: TokenUsage,
    /// 已带上分块上下文前缀的警告
    pub warnings: Vec<String>,
    /// 实际调用次数（含重试）
    pub attempts: usize,
    /// 模型调用失败时的错误
    pub error: Option<AppError>,
}

/// 分块处理流程
///
/// - 编排 prompt → model → parse
/// - 决定何时重试
/// - 不持有文件级状态，结果交给编排层汇总
pub struct ChunkFlow<'a, C: ModelClient> {
    client: &'a C,
    question_types: Vec<QuestionType>,
    questions_per_chunk: usize,
    model_options: ModelOptions,
    max_retries: usize,
}

impl<'a, C: ModelClient> ChunkFlow<'a, C> {
    /// 创建新的分块处理流程
    pub fn new(client: &'a C, config: &Config) -> Self {
        Self {
            client,
            question_types: config.question_generation.question_types.clone(),
            questions_per_chunk: config.question_generation.questions_per_chunk,
            model_options: config.ollama.options.clone(),
            max_retries: config.question_generation.max_retries,
        }
    }

    pub async fn run(&self, chunk: &TextChunk, ctx: &ChunkCtx) -> ChunkOutcome {
        let request = GenerationRequest {
            chunk: chunk.clone(),
            question_types: self.question_types.clone(),
            questions_per_chunk: self.questions_per_chunk,
            model_options: self.model_options.clone(),
        };

        info!(
            "[文件 {}] 🤖 {} 正在生成题目 ({} 字符)...",
            ctx.file_index, ctx, chunk.char_count
        );

        let prompt = prompt_builder::build(
            &request.chunk,
            &request.question_types,
            request.questions_per_chunk,
        );

        let (result, attempts) = self.call_with_retry(&prompt, &request.model_options, ctx).await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let retried = e.is_retryable();
                let error = AppError::from(e);
                let reason = if retried {
                    format!("{} 已尝试 {} 次，跳过该分块: {}", ctx, attempts, error)
                } else {
                    format!("{} 跳过该分块: {}", ctx, error)
                };
                warn!("[文件 {}] ⚠️ {}", ctx.file_index, reason);
                return ChunkOutcome {
                    status: ChunkStatus::Failed,
                    questions: Vec::new(),
                    usage: TokenUsage::default(),
                    warnings: vec![reason],
                    attempts,
                    error: Some(error),
                };
            }
        };

        let usage = response.usage();
        let (questions, parse_warnings) = response_parser::parse(
            &response.raw_text,
            request.questions_per_chunk,
            &request.question_types,
        );

        let warnings: Vec<String> = parse_warnings
            .into_iter()
            .map(|w| format!("{} {}", ctx, w))
            .collect();
        for warning in &warnings {
            warn!("[文件 {}] ⚠️ {}", ctx.file_index, warning);
        }

        let status = if questions.is_empty() {
            ChunkStatus::Empty
        } else {
            ChunkStatus::Parsed
        };

        info!(
            "[文件 {}] ✓ {} 得到 {} 道题 (tokens: {} 输入 / {} 输出, 耗时 {:.1}s)",
            ctx.file_index,
            ctx,
            questions.len(),
            usage.prompt_tokens,
            usage.completion_tokens,
            response.duration.as_secs_f64()
        );

        ChunkOutcome {
            status,
            questions,
            usage,
            warnings,
            attempts,
            error: None,
        }
    }

    /// 调用模型，连接失败和超时时重试
    ///
    /// 返回 (最后一次调用结果, 调用次数)
    async fn call_with_retry(
        &self,
        prompt: &str,
        options: &ModelOptions,
        ctx: &ChunkCtx,
    ) -> (Result<ModelResponse, ModelError>, usize) {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.generate(prompt, options).await {
                Ok(response) => return (Ok(response), attempt),
                Err(e) if e.is_retryable() && attempt <= self.max_retries => {
                    warn!(
                        "[文件 {}] {} 调用失败 (尝试 {}/{}): {}，重试中...",
                        ctx.file_index,
                        ctx,
                        attempt,
                        self.max_retries + 1,
                        e
                    );
                }
                Err(e) => return (Err(e), attempt),
            }
        }
    }
}
