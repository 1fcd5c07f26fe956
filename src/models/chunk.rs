use crate::config::ModelOptions;
use crate::models::question::{QuestionType, TokenUsage};
use std::time::Duration;

/// 文本分块
///
/// `char_count` 按字符（而非字节）计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub source_file: String,
    /// 分块在文件中的索引（从 0 开始）
    pub chunk_index: usize,
    pub content: String,
    pub char_count: usize,
}

impl TextChunk {
    pub fn new(source_file: impl Into<String>, chunk_index: usize, content: String) -> Self {
        let char_count = content.chars().count();
        Self {
            source_file: source_file.into(),
            chunk_index,
            content,
            char_count,
        }
    }

    /// 分块编号（从 1 开始，用于日志和输出）
    pub fn number(&self) -> usize {
        self.chunk_index + 1
    }
}

/// 单个分块的生成请求
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub chunk: TextChunk,
    pub question_types: Vec<QuestionType>,
    pub questions_per_chunk: usize,
    pub model_options: ModelOptions,
}

/// 模型返回的原始结果
#[derive(Debug, Clone, Default)]
pub struct ModelResponse {
    pub raw_text: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub duration: Duration,
}

impl ModelResponse {
    pub fn usage(&self) -> TokenUsage {
        TokenUsage::new(self.prompt_tokens, self.completion_tokens)
    }
}
