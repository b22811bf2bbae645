//! Server mode
//!
//! 组装中间件和路由并启动 HTTP 服务器。

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::warn;

use crate::api::middleware::RequestLogger;
use crate::api::services::configure;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup()
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let services = web::Data::new(startup.services);
    let views = web::Data::from(startup.views);
    let runner = web::Data::from(startup.runner);

    let config = crate::config::get_config();
    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let db_for_shutdown = services.storage.get_db().clone();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "SAMEORIGIN"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .app_data(services.clone())
            .app_data(views.clone())
            .app_data(runner.clone())
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .app_data(web::FormConfig::default().limit(256 * 1024))
            .configure(configure)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count)
    .bind(bind_address)?
    .run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
