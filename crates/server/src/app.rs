use crate::services::csv_import::CsvImporter;
use crate::{router::AppRouter, services::Services};
use anyhow::Context;
use axum::serve;
use database::customer::repository::DynCustomerRepository;
use database::workflow_status::repository::DynWorkflowStatusRepository;
use database::{ordering::PosConfig, Database};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::info;
use utils::AppConfig;

pub struct ApplicationServer;

impl ApplicationServer {
    pub async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
        let address = format!("{}:{}", config.app_host, config.app_port);
        let tcp_listener = tokio::net::TcpListener::bind(address)
            .await
            .context("🔴 Failed to bind TCP listener")?;

        let local_addr = tcp_listener.local_addr().context("🔴 Failed to get local address")?;

        let db = Database::new(config.clone()).await?;
        // 唯一稀疏pos索引是scan-then-write竞态的存储层兜底
        db.init_indexes().await?;

        Self::run_csv_imports(&config, &db).await?;

        let services = Services::new(db, PosConfig::from(config.as_ref()));
        let router = AppRouter::new(services);

        info!("🟢 server:eca-backend has launched on {local_addr} 🚀");

        serve(tcp_listener, router.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(Self::shutdown_signal())
            .await
            .context("🔴 Failed to start server")?;

        Ok(())
    }

    /// 启动期的一次性CSV导入，先导状态再导客户
    async fn run_csv_imports(config: &AppConfig, db: &Database) -> anyhow::Result<()> {
        if config.import_workflow_statuses_csv.is_none() && config.import_customers_csv.is_none() {
            return Ok(());
        }

        let database = Arc::new(db.clone());
        let importer = CsvImporter::new(
            database.clone() as DynCustomerRepository,
            database as DynWorkflowStatusRepository,
        );

        if let Some(path) = &config.import_workflow_statuses_csv {
            let file = std::fs::File::open(path).with_context(|| format!("🔴 Failed to open csv file {}", path))?;
            importer.import_workflow_statuses(file).await?;
        }

        if let Some(path) = &config.import_customers_csv {
            let file = std::fs::File::open(path).with_context(|| format!("🔴 Failed to open csv file {}", path))?;
            importer.import_customers(file).await?;
        }

        Ok(())
    }

    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c().await.expect("🔴 Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("🔴 Failed to install signal handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        tracing::warn!("❌ Signal received, starting graceful shutdown...");
    }
}
