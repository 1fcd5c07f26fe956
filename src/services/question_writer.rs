//! 题目写入服务 - 业务能力层
//!
//! 只负责"把一个 QuestionSet 写成 JSON 文件"，不关心流程

use crate::error::FileError;
use crate::models::QuestionSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// 题目写入服务
///
/// 输出文件名为 `{源文件名去扩展名}_questions.json`
pub struct QuestionWriter {
    output_dir: PathBuf,
}

impl QuestionWriter {
    /// 创建新的写入服务
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 计算源文件对应的输出路径
    pub fn output_path(&self, source_file: &str) -> PathBuf {
        let stem = Path::new(source_file)
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy();
        self.output_dir.join(format!("{}_questions.json", stem))
    }

    /// 写入题目集
    ///
    /// 先写临时文件再改名，避免中途失败留下半截 JSON
    pub async fn write(&self, set: &QuestionSet) -> Result<PathBuf, FileError> {
        let path = self.output_path(&set.source_file);
        let path_str = path.display().to_string();

        debug!(
            "写入题目: {} | 题目数: {} | 路径: {}",
            set.source_file, set.total_questions, path_str
        );

        let json = serde_json::to_string_pretty(set).map_err(|source| {
            FileError::SerializeFailed {
                path: path_str.clone(),
                source,
            }
        })?;

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| FileError::CreateDirFailed {
                path: self.output_dir.display().to_string(),
                source,
            })?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: tmp_path.display().to_string(),
                source,
            })?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: path_str,
                source,
            })?;

        Ok(path)
    }
}
