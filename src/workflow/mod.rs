//! 流程层
//!
//! 核心职责：定义每个练习的完整处理流程
//!
//! 每个子模块对应一个练习端点，把各协作方能力按固定顺序
//! 串成一条管道：抓取输入 → 转换 → 上报。
//! 本层不持有任何资源，只依赖注入进来的客户端集合。

pub mod archive_sort;
pub mod calibration;
pub mod captcha_login;
pub mod censor;
pub mod interrogation;
pub mod robot_portrait;
pub mod robot_verify;
