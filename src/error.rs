use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// API 调用错误
    Api(ApiError),
    /// LLM 服务错误
    Llm(LlmError),
    /// 文件操作错误
    File(FileError),
    /// 业务逻辑错误
    Business(BusinessError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Api(e) => write!(f, "API错误: {}", e),
            AppError::Llm(e) => write!(f, "LLM错误: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Business(e) => write!(f, "业务错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Api(e) => Some(e),
            AppError::Llm(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Business(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// API 调用错误
#[derive(Debug)]
pub enum ApiError {
    /// 网络请求失败
    RequestFailed {
        endpoint: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// API 返回非 2xx 状态
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// JSON 解析失败
    JsonParseFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::RequestFailed { endpoint, source } => {
                write!(f, "API请求失败 ({}): {}", endpoint, source)
            }
            ApiError::BadStatus {
                endpoint,
                status,
                body,
            } => {
                write!(
                    f,
                    "API返回错误状态 ({}): status={}, body={}",
                    endpoint, status, body
                )
            }
            ApiError::JsonParseFailed { source } => {
                write!(f, "JSON解析失败: {}", source)
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::RequestFailed { source, .. } | ApiError::JsonParseFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// LLM 服务错误
#[derive(Debug)]
pub enum LlmError {
    /// API 调用失败
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    EmptyContent {
        model: String,
    },
    /// 返回内容不符合预期结构
    MalformedOutput {
        detail: String,
    },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ApiCallFailed { model, source } => {
                write!(f, "LLM API调用失败 (模型: {}): {}", model, source)
            }
            LlmError::EmptyContent { model } => {
                write!(f, "LLM返回内容为空 (模型: {})", model)
            }
            LlmError::MalformedOutput { detail } => {
                write!(f, "LLM返回内容格式不正确: {}", detail)
            }
        }
    }
}

impl std::error::Error for LlmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LlmError::ApiCallFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 目录不存在
    DirectoryNotFound {
        path: String,
    },
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录中没有可用文件
    NoUsableFiles {
        path: String,
    },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::DirectoryNotFound { path } => write!(f, "目录不存在: {}", path),
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::NoUsableFiles { path } => {
                write!(f, "目录中没有可用文件: {}", path)
            }
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 业务逻辑错误
#[derive(Debug)]
pub enum BusinessError {
    /// 页面中找不到验证问题
    CaptchaQuestionNotFound,
    /// 加法算式无法解析
    MalformedAddition {
        input: String,
    },
    /// 生成结果中没有图片 URL
    NoImageUrl,
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessError::CaptchaQuestionNotFound => {
                write!(f, "页面中找不到验证问题")
            }
            BusinessError::MalformedAddition { input } => {
                write!(f, "加法算式无法解析: {}", input)
            }
            BusinessError::NoImageUrl => {
                write!(f, "生成结果中没有图片 URL")
            }
        }
    }
}

impl std::error::Error for BusinessError {}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 必需的环境变量不存在
    MissingEnvVars {
        names: Vec<String>,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingEnvVars { names } => {
                write!(f, "缺少必需的环境变量: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "未知".to_string());
        AppError::Api(ApiError::RequestFailed {
            endpoint,
            source: Box::new(err),
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 创建API状态码错误
    pub fn api_bad_status(
        endpoint: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        AppError::Api(ApiError::BadStatus {
            endpoint: endpoint.into(),
            status,
            body: body.into(),
        })
    }

    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建LLM输出格式错误
    pub fn llm_malformed_output(detail: impl Into<String>) -> Self {
        AppError::Llm(LlmError::MalformedOutput {
            detail: detail.into(),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
