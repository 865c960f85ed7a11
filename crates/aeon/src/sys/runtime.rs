use crate::events::AppEvent;
use crate::sys::server;
use crate::{catalog, config};
use async_channel::Sender;
use std::path::PathBuf;
use std::thread;
use tokio::runtime::Runtime;
use tokio::task::JoinSet;

/// Runs the control socket, config watcher and catalog service on their own runtime thread.
/// The thread ends once every service has returned.
pub fn start_background_services(tx: Sender<AppEvent>, catalog: Option<PathBuf>) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                return;
            }
        };

        rt.block_on(async move {
            let mut services = JoinSet::new();
            services.spawn(server::run_server(tx.clone()));
            services.spawn(config::run_async_watcher(tx.clone()));
            services.spawn(catalog::run_catalog_service(catalog, tx));

            while let Some(joined) = services.join_next().await {
                if let Err(e) = joined {
                    log::error!("Background service failed: {}", e);
                }
            }
            log::debug!("All background services stopped");
        });
    });
}
