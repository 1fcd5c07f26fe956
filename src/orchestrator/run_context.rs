//! 运行上下文
//!
//! 整个批处理过程中的累计状态，以 `&mut` 方式在文件/分块处理间传递

use crate::models::TokenUsage;
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 单个文件的处理状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileState {
    Pending,
    Chunking,
    /// 正在处理第 `current` 块（共 `total` 块）
    Generating { current: usize, total: usize },
    Aggregating,
    Written,
    Failed(String),
}

impl Display for FileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileState::Pending => write!(f, "等待中"),
            FileState::Chunking => write!(f, "分块中"),
            FileState::Generating { current, total } => write!(f, "生成中 {}/{}", current, total),
            FileState::Aggregating => write!(f, "汇总中"),
            FileState::Written => write!(f, "已写入"),
            FileState::Failed(reason) => write!(f, "失败: {}", reason),
        }
    }
}

/// 单个文件的处理报告
#[derive(Debug, Clone)]
pub struct FileReport {
    pub source_file: String,
    pub state: FileState,
    pub question_count: usize,
    pub chunk_count: usize,
    pub failed_chunks: usize,
    pub token_usage: TokenUsage,
    pub output_path: Option<PathBuf>,
}

impl FileReport {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            state: FileState::Pending,
            question_count: 0,
            chunk_count: 0,
            failed_chunks: 0,
            token_usage: TokenUsage::default(),
            output_path: None,
        }
    }

    /// 标记失败并返回自身，便于提前返回
    pub fn fail(mut self, reason: impl Into<String>) -> Self {
        self.state = FileState::Failed(reason.into());
        self
    }
}

/// 运行上下文
#[derive(Debug)]
pub struct RunContext {
    /// 全部文件的 token 用量合计
    pub token_usage: TokenUsage,
    /// 所有分块/文件级警告
    pub warnings: Vec<String>,
    /// 按处理顺序排列的文件报告
    pub files: Vec<FileReport>,
    interrupt: Arc<AtomicBool>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self::with_interrupt(Arc::new(AtomicBool::new(false)))
    }

    /// 使用外部共享的中断标志
    pub fn with_interrupt(interrupt: Arc<AtomicBool>) -> Self {
        Self {
            token_usage: TokenUsage::default(),
            warnings: Vec::new(),
            files: Vec::new(),
            interrupt,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    pub fn add_usage(&mut self, usage: TokenUsage) {
        self.token_usage += usage;
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn written_count(&self) -> usize {
        self.files
            .iter()
            .filter(|r| r.state == FileState::Written)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|r| matches!(r.state, FileState::Failed(_)))
            .count()
    }

    /// 已写入文件中的题目总数
    pub fn total_questions(&self) -> usize {
        self.files
            .iter()
            .filter(|r| r.state == FileState::Written)
            .map(|r| r.question_count)
            .sum()
    }
}
