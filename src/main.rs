use anyhow::Result;
use centrala_tasks::app::App;
use centrala_tasks::config::Config;
use centrala_tasks::utils::logging;
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置，缺少必需变量时直接退出，不绑定端口
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("🚫 [启动失败] {}", e);
            std::process::exit(1);
        }
    };

    // 初始化并运行应用
    App::initialize(config)?.run().await?;

    Ok(())
}
