use anyhow::Context;
use clap::Parser;
use server::app::ApplicationServer;
use std::sync::Arc;
use utils::{AppConfig, EnvLoader, Logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 根据 CARGO_ENV 加载对应的环境配置文件
    EnvLoader::load_env_file().ok();

    let config = Arc::new(AppConfig::parse());

    // guard在main结束前不能drop，否则日志写入线程提前退出
    let _guard = Logger::new(config.cargo_env);

    ApplicationServer::serve(config)
        .await
        .context("🔴 Failed to start server")?;

    Ok(())
}
