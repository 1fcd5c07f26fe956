//! 分块处理上下文
//!
//! 封装"我正在处理哪个文件的第几块"这一信息

use std::fmt::Display;

/// 分块处理上下文
#[derive(Debug, Clone)]
pub struct ChunkCtx {
    /// 文件索引（仅用于日志显示，从 1 开始）
    pub file_index: usize,

    /// 源文件名
    pub source_file: String,

    /// 分块编号（从 1 开始）
    pub chunk_number: usize,

    /// 该文件的分块总数
    pub total_chunks: usize,
}

impl ChunkCtx {
    pub fn new(
        file_index: usize,
        source_file: impl Into<String>,
        chunk_number: usize,
        total_chunks: usize,
    ) -> Self {
        Self {
            file_index,
            source_file: source_file.into(),
            chunk_number,
            total_chunks,
        }
    }
}

impl Display for ChunkCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} 分块 {}/{}]",
            self.source_file, self.chunk_number, self.total_chunks
        )
    }
}
