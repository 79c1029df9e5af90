use std::{net::SocketAddr, sync::Arc};

use thiserror::Error;
use tokio::net::TcpListener;

use crate::{
    api::UserApi,
    config::Config,
    db::{create_pool, run_migrations, DBClient, UserExt},
    handlers::users::UserHandler,
    openapi::{OpenApiDoc, OpenApiError},
    routes::{create_router, RouterOptions},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to initialize database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("failed to create handler: {0}")]
    OpenApi(#[from] OpenApiError),

    #[error("server encountered an error: {0}")]
    Server(#[from] std::io::Error),
}

// -- 进程外壳：持有配置与数据库客户端
#[derive(Debug)]
pub struct App {
    config: Config,
    db_client: DBClient,
}

impl App {
    pub async fn new(config: Config) -> Result<Self, AppError> {
        // -- 创建数据库连接池
        let pool = create_pool(&config.database).await?;
        tracing::info!(
            host = %config.database.host,
            port = config.database.port,
            database = %config.database.name,
            "Connection to the database is successful"
        );

        run_migrations(&pool).await?;

        Ok(App {
            config,
            db_client: DBClient::new(pool),
        })
    }

    /// 启动 HTTP 服务，收到 Ctrl+C 或 SIGTERM 后优雅退出并关闭连接池
    pub async fn run(self) -> Result<(), AppError> {
        let result = self.serve().await;

        self.db_client.close().await;
        tracing::info!("Server exiting");

        result
    }

    async fn serve(&self) -> Result<(), AppError> {
        let doc = OpenApiDoc::load(&self.config.openapi)?;
        let api: Arc<dyn UserApi> = Arc::new(UserHandler::new(self.db_client.clone()));
        let app = create_router(api, doc, &RouterOptions::from_config(&self.config));

        let addr = format!("{}:{}", self.config.http.host, self.config.http.port);
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!(
            addr = %addr,
            mode = %self.config.app.mode,
            read_timeout = ?self.config.http.read_timeout,
            write_timeout = ?self.config.http.write_timeout,
            "Starting server"
        );

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down server...");
}
