use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 模型服务错误
    #[error("模型错误: {0}")]
    Model(#[from] ModelError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 模型服务调用错误
///
/// 只有 `Connection` 和 `Timeout` 值得重试，`Model` 表示服务端明确拒绝或返回了坏数据
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    /// 无法连接（拒绝连接、DNS 失败等）
    #[error("无法连接到模型服务 ({endpoint}): {message}")]
    Connection { endpoint: String, message: String },
    /// 超时未响应
    #[error("模型服务响应超时 ({endpoint}), 超过 {timeout_secs} 秒")]
    Timeout { endpoint: String, timeout_secs: u64 },
    /// 非成功状态码或响应结构不合法
    #[error("模型服务返回错误 ({endpoint}): status={status:?}, {message}")]
    Model {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },
}

impl ModelError {
    /// 是否属于可重试的传输层错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelError::Connection { .. } | ModelError::Timeout { .. })
    }
}

/// 模型输出无法解码
///
/// 只在解析层内部使用，最终转为分块警告，不会中断文件处理
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("模型输出中没有找到 JSON 结构")]
    NoStructuredBlock,
    #[error("JSON 解码失败（修复后仍失败）: {0}")]
    Unrecoverable(String),
    #[error("JSON 顶层结构不是题目列表")]
    UnexpectedShape,
}

/// 单道题目校验失败
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("题目条目不是 JSON 对象")]
    NotAnObject,
    #[error("缺少字段: {0}")]
    MissingField(&'static str),
    #[error("字段为空: {0}")]
    EmptyField(&'static str),
    #[error("字段格式不正确: {0}")]
    InvalidField(&'static str),
    #[error("未知题型: {0}")]
    UnknownType(String),
    #[error("题型 {0} 不在本次请求范围内")]
    TypeNotRequested(String),
    #[error("选择题需要 4 个选项，实际 {0} 个")]
    OptionCount(usize),
    #[error("选择题选项重复")]
    DuplicateOptions,
    #[error("正确答案索引 {index} 超出范围 [0, {max_index}]")]
    CorrectIndexOutOfRange { index: i64, max_index: usize },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("创建目录失败 ({path}): {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("序列化题目失败 ({path}): {source}")]
    SerializeFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法读取配置文件 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON 配置解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("TOML 配置解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("不支持的配置文件格式: {path}")]
    UnsupportedFormat { path: String },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    #[error("配置项 {key} 不合法: {reason}")]
    InvalidValue { key: &'static str, reason: String },
    #[error("无法创建目录 ({path}): {source}")]
    DirectoryUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
