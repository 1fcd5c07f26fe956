//! # Study Questions
//!
//! 把提取好的讲义文本交给本地 Ollama 模型，批量生成学习题目的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 持有 HTTP 连接，只暴露"发一次请求"的能力
//! - `ModelClient` - 模型调用抽象，测试中可替换
//! - `OllamaClient` - `/api/generate` 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，彼此独立
//! - `Chunker` - 按段落/句子边界切分文本
//! - `prompt_builder` - 渲染出题提示词
//! - `response_parser` - 从模型的杂乱输出中提取并校验题目
//! - `QuestionWriter` - 写 `{文件名}_questions.json`
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个分块"的完整处理流程
//! - `ChunkCtx` - 上下文封装（文件名 + 分块编号）
//! - `ChunkFlow` - 流程编排（prompt → model → parse，含重试）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理器，管理客户端和中断
//! - `orchestrator/file_processor` - 单个文件处理器，遍历分块并写出
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{ModelClient, OllamaClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Question, QuestionSet, QuestionType, TextChunk, TokenUsage};
pub use orchestrator::{process_file, App, RunContext};
pub use workflow::{ChunkCtx, ChunkFlow};
