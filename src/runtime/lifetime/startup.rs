use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::get_config;
use crate::services::AppServices;
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub services: AppServices,
}

/// 准备服务器启动的上下文：存储、迁移、上传目录和服务集合
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = get_config();

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let upload_dir = &config.uploads.dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .with_context(|| format!("Failed to create upload directory '{}'", upload_dir))?;
    debug!("Upload directory ready: {}", upload_dir);

    let services = AppServices::from_storage(storage.clone());

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext { storage, services })
}
