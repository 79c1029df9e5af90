use std::process::ExitCode;

use dotenvy::dotenv;
use users_api::{app::App, config::Config, logging::init_logging};

#[tokio::main]
async fn main() -> ExitCode {
    // -- 加载环境变量
    dotenv().ok();

    // -- 加载配置
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config: {err}");
            return ExitCode::FAILURE;
        }
    };

    // -- 初始化日志，guard 需存活到进程结束
    let _guard = match init_logging(&config.log, config.app.debug) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("failed to initialize logging: {err}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(config = %config, "Configuration loaded");

    let app = match App::new(config).await {
        Ok(app) => app,
        Err(err) => {
            tracing::error!(error = %err, "failed to create application");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = app.run().await {
        tracing::error!(error = %err, "application error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
