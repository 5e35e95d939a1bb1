use crate::error::ConfigError;

/// 程序配置文件
///
/// 必需的环境变量（缺失时启动失败，不会绑定端口）：
/// - `CENTRALA_URL` - 数据源 / 评分接口基础地址
/// - `AIDEVS_API_KEY` - 评分接口访问凭证
/// - `OPENAI_API_KEY` - LLM API 密钥
/// - `GROQ_API_KEY` - 语音转写 API 密钥
///
/// 其余配置项均有默认值，可通过环境变量覆盖。
#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP 服务监听端口
    pub port: u16,
    /// 评分接口基础地址
    pub centrala_url: String,
    /// 评分接口访问凭证
    pub aidevs_api_key: String,
    // --- LLM 配置 ---
    pub openai_api_key: String,
    pub openai_api_base: String,
    pub chat_model_name: String,
    pub image_model_name: String,
    // --- 语音转写配置 ---
    pub groq_api_key: String,
    pub groq_api_base: String,
    pub speech_model_name: String,
    // --- OCR 配置 ---
    pub ocr_api_base: String,
    // --- 机器人站点配置 ---
    pub robots_login_url: String,
    pub robots_portal_url: String,
    pub robots_username: String,
    pub robots_password: String,
    // --- 本地数据目录 ---
    pub recordings_dir: String,
    pub archive_dir: String,
    /// 出站请求超时（秒）
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            centrala_url: String::new(),
            aidevs_api_key: String::new(),
            openai_api_key: String::new(),
            openai_api_base: "https://api.openai.com/v1".to_string(),
            chat_model_name: "gpt-4o-mini".to_string(),
            image_model_name: "dall-e-3".to_string(),
            groq_api_key: String::new(),
            groq_api_base: "https://api.groq.com/openai/v1".to_string(),
            speech_model_name: "whisper-large-v3-turbo".to_string(),
            ocr_api_base: "http://localhost:8884".to_string(),
            robots_login_url: "https://xyz.ag3nts.org".to_string(),
            robots_portal_url: "https://xyz.ag3nts.org".to_string(),
            robots_username: "tester".to_string(),
            robots_password: "574e112a".to_string(),
            recordings_dir: "data/przesluchania".to_string(),
            archive_dir: "data/pliki_z_fabryki".to_string(),
            http_timeout_secs: 60,
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// 从任意变量来源加载配置（便于测试）
    ///
    /// 一次性收集所有缺失的必需变量，错误信息中逐一列出。
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut missing: Vec<&'static str> = Vec::new();
        let mut required = |name: &'static str| -> String {
            match lookup(name) {
                Some(v) if !v.trim().is_empty() => v,
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let centrala_url = required("CENTRALA_URL");
        let aidevs_api_key = required("AIDEVS_API_KEY");
        let openai_api_key = required("OPENAI_API_KEY");
        let groq_api_key = required("GROQ_API_KEY");
        drop(required);

        if !missing.is_empty() {
            return Err(ConfigError::MissingEnvVars {
                names: missing.into_iter().map(String::from).collect(),
            });
        }

        let default = Self::default();
        Ok(Self {
            port: lookup("PORT").and_then(|v| v.parse().ok()).unwrap_or(default.port),
            centrala_url,
            aidevs_api_key,
            openai_api_key,
            openai_api_base: lookup("OPENAI_API_BASE").unwrap_or(default.openai_api_base),
            chat_model_name: lookup("CHAT_MODEL_NAME").unwrap_or(default.chat_model_name),
            image_model_name: lookup("IMAGE_MODEL_NAME").unwrap_or(default.image_model_name),
            groq_api_key,
            groq_api_base: lookup("GROQ_API_BASE").unwrap_or(default.groq_api_base),
            speech_model_name: lookup("SPEECH_MODEL_NAME").unwrap_or(default.speech_model_name),
            ocr_api_base: lookup("OCR_API_BASE").unwrap_or(default.ocr_api_base),
            robots_login_url: lookup("ROBOTS_LOGIN_URL").unwrap_or(default.robots_login_url),
            robots_portal_url: lookup("ROBOTS_PORTAL_URL").unwrap_or(default.robots_portal_url),
            robots_username: lookup("ROBOTS_USERNAME").unwrap_or(default.robots_username),
            robots_password: lookup("ROBOTS_PASSWORD").unwrap_or(default.robots_password),
            recordings_dir: lookup("RECORDINGS_DIR").unwrap_or(default.recordings_dir),
            archive_dir: lookup("ARCHIVE_DIR").unwrap_or(default.archive_dir),
            http_timeout_secs: lookup("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.http_timeout_secs),
        })
    }
}
