use crate::error::FileError;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 扫描文件夹中所有 `.txt` 文件
///
/// 按文件名排序，保证多次运行的处理顺序一致
pub async fn list_text_files(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder.display());
    }

    let mut text_files = Vec::new();
    let mut entries = fs::read_dir(folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_txt = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if is_txt && path.is_file() {
            text_files.push(path);
        }
    }

    text_files.sort();

    if text_files.is_empty() {
        tracing::warn!("在文件夹 {} 中没有找到 .txt 文件", folder.display());
    }

    Ok(text_files)
}

/// 读取单个文本文件
pub async fn load_text_file(path: &Path) -> Result<String, FileError> {
    let bytes = fs::read(path).await.map_err(|source| FileError::ReadFailed {
        path: path.display().to_string(),
        source,
    })?;

    // 提取工具偶尔会写出非法 UTF-8，按有损方式读取
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// 取文件名（不含目录）
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}
