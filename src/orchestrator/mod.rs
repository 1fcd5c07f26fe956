//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文件处理器
//! - 管理应用生命周期（初始化、运行）
//! - 扫描输入目录（Vec<PathBuf>）
//! - 持有模型客户端与中断标志
//! - 输出全局统计信息
//!
//! ### `file_processor` - 单个文件处理器
//! - 读取并分块单个文件
//! - 创建并复用 ChunkFlow
//! - 汇总 QuestionSet 并写出
//!
//! ### `run_context` - 运行上下文
//! - 累计 token 用量、警告与每个文件的报告
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<文件>)
//!     ↓
//! file_processor (处理 Vec<TextChunk>)
//!     ↓
//! workflow::ChunkFlow (处理单个 TextChunk)
//!     ↓
//! services (能力层：chunker / prompt / parser / writer)
//!     ↓
//! clients (模型客户端：Ollama)
//! ```

pub mod batch_processor;
pub mod file_processor;
pub mod run_context;

// 重新导出主要类型
pub use batch_processor::App;
pub use file_processor::process_file;
pub use run_context::{FileReport, FileState, RunContext};
