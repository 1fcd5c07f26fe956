/// Ollama 客户端
///
/// 封装 `/api/generate` 调用。本层不做重试，重试策略由流程层决定
use crate::config::{ModelOptions, OllamaConfig};
use crate::error::ModelError;
use crate::models::ModelResponse;
use crate::utils::logging::truncate_text;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// 生成模型客户端
///
/// 流程层只依赖这个 trait，测试中可以替换为脚本化的假客户端
#[allow(async_fn_in_trait)]
pub trait ModelClient {
    /// 模型名称（写入输出文件）
    fn model_name(&self) -> &str;

    /// 发送一次生成请求
    async fn generate(
        &self,
        prompt: &str,
        options: &ModelOptions,
    ) -> Result<ModelResponse, ModelError>;
}

/// 请求体
#[derive(Debug, Serialize)]
struct GenerateRequestBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a ModelOptions,
}

/// 响应体，缺失的计数字段按 0 处理
#[derive(Debug, Deserialize)]
struct GenerateResponseBody {
    response: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
    /// 纳秒
    #[serde(default)]
    total_duration: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

/// Ollama 客户端
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model_name: String,
    timeout: Duration,
}

impl OllamaClient {
    /// 创建新的 Ollama 客户端
    pub fn new(config: &OllamaConfig) -> Self {
        Self::with_timeout(
            &config.base_url,
            &config.model,
            config.timeout_duration(),
        )
    }

    /// 使用自定义超时创建客户端
    pub fn with_timeout(
        base_url: impl Into<String>,
        model_name: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: model_name.into(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn generate_endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    /// 检查 Ollama 是否可达（GET `/api/tags`）
    pub async fn test_connection(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self
            .http
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("连接测试失败 ({}): {}", url, e);
                false
            }
        }
    }

    /// 把 reqwest 错误归类为连接错误、超时或模型错误
    fn classify(&self, endpoint: &str, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_secs: self.timeout.as_secs().max(1),
            }
        } else if err.is_connect() || err.is_request() {
            ModelError::Connection {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            }
        } else {
            ModelError::Model {
                endpoint: endpoint.to_string(),
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

impl ModelClient for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &ModelOptions,
    ) -> Result<ModelResponse, ModelError> {
        let endpoint = self.generate_endpoint();
        debug!(
            "调用 Ollama，模型: {}，提示词长度: {} 字符",
            self.model_name,
            prompt.chars().count()
        );

        let payload = GenerateRequestBody {
            model: &self.model_name,
            prompt,
            stream: false,
            options,
        };

        let started = Instant::now();
        let response = self
            .http
            .post(&endpoint)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(&endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify(&endpoint, e))?;

        if !status.is_success() {
            warn!("Ollama 返回非成功状态: {}", status);
            return Err(ModelError::Model {
                endpoint,
                status: Some(status.as_u16()),
                message: truncate_text(&body, 200),
            });
        }

        parse_envelope(&endpoint, &body, started.elapsed())
    }
}

/// 解析 `/api/generate` 的响应外壳
///
/// `elapsed` 在服务端没有返回 `total_duration` 时作为耗时
fn parse_envelope(
    endpoint: &str,
    body: &str,
    elapsed: Duration,
) -> Result<ModelResponse, ModelError> {
    let envelope: GenerateResponseBody =
        serde_json::from_str(body).map_err(|e| ModelError::Model {
            endpoint: endpoint.to_string(),
            status: None,
            message: format!("响应不是合法 JSON: {}", e),
        })?;

    if let Some(error) = envelope.error {
        return Err(ModelError::Model {
            endpoint: endpoint.to_string(),
            status: None,
            message: error,
        });
    }

    let raw_text = envelope.response.ok_or_else(|| ModelError::Model {
        endpoint: endpoint.to_string(),
        status: None,
        message: "响应缺少 response 字段".to_string(),
    })?;

    Ok(ModelResponse {
        raw_text: raw_text.trim().to_string(),
        prompt_tokens: envelope.prompt_eval_count.unwrap_or(0),
        completion_tokens: envelope.eval_count.unwrap_or(0),
        duration: envelope
            .total_duration
            .map(Duration::from_nanos)
            .unwrap_or(elapsed),
    })
}
