//! 协作方客户端
//!
//! 负责所有与外部系统的交互，每个客户端只暴露窄接口

pub mod centrala_client;
pub mod llm_client;
pub mod ocr_client;
pub mod speech_client;

pub use centrala_client::CentralaClient;
pub use llm_client::LlmClient;
pub use ocr_client::OcrClient;
pub use speech_client::SpeechClient;
