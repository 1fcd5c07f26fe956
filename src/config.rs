use crate::error::ConfigError;
use crate::models::QuestionType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认配置文件路径
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// 程序配置
///
/// 缺失的键使用默认值补齐
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ollama: OllamaConfig,
    pub question_generation: QuestionGenerationConfig,
}

/// Ollama 服务配置
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    /// 单次请求超时（秒）
    pub timeout: u64,
    pub options: ModelOptions,
}

/// 生成参数，原样放进请求体的 `options`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub num_predict: u32,
}

/// 出题配置
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionGenerationConfig {
    pub question_types: Vec<QuestionType>,
    pub questions_per_chunk: usize,
    /// 分块最大字符数
    pub max_chunk_size: usize,
    pub text_input_dir: String,
    pub questions_output_dir: String,
    /// 连接失败/超时后的最大重试次数
    pub max_retries: usize,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            timeout: 120,
            options: ModelOptions::default(),
        }
    }
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            num_predict: 2000,
        }
    }
}

impl Default for QuestionGenerationConfig {
    fn default() -> Self {
        Self {
            question_types: QuestionType::ALL.to_vec(),
            questions_per_chunk: 4,
            max_chunk_size: 4000,
            text_input_dir: "text_output".to_string(),
            questions_output_dir: "questions_output".to_string(),
            max_retries: 2,
        }
    }
}

impl OllamaConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl QuestionGenerationConfig {
    pub fn input_dir(&self) -> PathBuf {
        PathBuf::from(&self.text_input_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.questions_output_dir)
    }
}

impl Config {
    /// 从配置文件加载（按扩展名选择 JSON 或 TOML）
    ///
    /// 文件不存在时使用默认配置；文件存在但无法解析视为致命错误
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::warn!(
                "⚠️ 配置文件 {} 不存在，使用默认配置",
                path.display()
            );
            let mut config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        let path_str = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path_str.clone(),
            source,
        })?;

        let mut config = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Self::from_json_str(&content, &path_str)?,
            Some("toml") => {
                toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
                    path: path_str.clone(),
                    source,
                })?
            }
            _ => return Err(ConfigError::UnsupportedFormat { path: path_str }),
        };

        config.validate()?;
        Ok(config)
    }

    fn from_json_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|source| ConfigError::JsonParseFailed {
            path: path.to_string(),
            source,
        })
    }

    /// 加载配置文件并应用环境变量覆盖
    ///
    /// - `SETTINGS_FILE`: 配置文件路径（默认 `settings.json`）
    /// - `OLLAMA_BASE_URL` / `OLLAMA_MODEL` / `OLLAMA_TIMEOUT`
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings_file =
            std::env::var("SETTINGS_FILE").unwrap_or_else(|_| DEFAULT_SETTINGS_FILE.to_string());
        let mut config = Self::load(Path::new(&settings_file))?;

        if let Ok(base_url) = std::env::var("OLLAMA_BASE_URL") {
            config.ollama.base_url = base_url;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            config.ollama.model = model;
        }
        if let Ok(value) = std::env::var("OLLAMA_TIMEOUT") {
            config.ollama.timeout =
                value
                    .parse()
                    .map_err(|_| ConfigError::EnvVarParseFailed {
                        var_name: "OLLAMA_TIMEOUT".to_string(),
                        value: value.clone(),
                        expected_type: "u64".to_string(),
                    })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// 校验配置并去除重复题型（保持原顺序）
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let qg = &mut self.question_generation;

        let configured = std::mem::take(&mut qg.question_types);
        let mut seen = Vec::with_capacity(configured.len());
        for question_type in configured {
            if !seen.contains(&question_type) {
                seen.push(question_type);
            }
        }
        qg.question_types = seen;

        if qg.question_types.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "question_generation.question_types",
                reason: "至少需要一种题型".to_string(),
            });
        }
        if qg.questions_per_chunk == 0 {
            return Err(ConfigError::InvalidValue {
                key: "question_generation.questions_per_chunk",
                reason: "必须大于 0".to_string(),
            });
        }
        if qg.max_chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "question_generation.max_chunk_size",
                reason: "必须大于 0".to_string(),
            });
        }
        if self.ollama.timeout == 0 {
            return Err(ConfigError::InvalidValue {
                key: "ollama.timeout",
                reason: "必须大于 0 秒".to_string(),
            });
        }
        if self.ollama.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "ollama.base_url",
                reason: "不能为空".to_string(),
            });
        }

        Ok(())
    }

    /// 创建输入、输出目录（已存在则跳过）
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        for dir in [
            self.question_generation.input_dir(),
            self.question_generation.output_dir(),
        ] {
            if dir.exists() {
                tracing::info!("   ✅ 目录已存在: {}", dir.display());
                continue;
            }
            std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DirectoryUnavailable {
                path: dir.display().to_string(),
                source,
            })?;
            tracing::info!("   📁 已创建目录: {}", dir.display());
        }
        Ok(())
    }
}
