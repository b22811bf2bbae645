use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::session::get_session_service;
use crate::scheduler::TaskRunner;
use crate::services::AppServices;
use crate::storage::StorageFactory;
use crate::views::Views;

pub struct StartupContext {
    pub services: AppServices,
    pub views: Arc<Views>,
    pub runner: Arc<TaskRunner>,
}

/// 准备服务器启动的上下文
/// 包括存储、默认设置、模板和定时任务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let services = AppServices::new(storage);
    services
        .settings
        .ensure_defaults()
        .await
        .context("Failed to initialize system settings")?;

    let views = Arc::new(Views::new().context("Failed to load templates")?);

    // 提前初始化，密钥缺失的警告在启动时打印
    get_session_service();

    let runner = Arc::new(TaskRunner::with_default_tasks(&services));
    debug!("Scheduled tasks: {:?}", runner.task_names());

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        services,
        views,
        runner,
    })
}
