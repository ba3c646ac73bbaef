//! Daemon initialization.

use crate::app::AppState;
use crate::gateway::{GatewayBootstrap, GatewayConfig};
use crate::ingress::build_router;
use courier_config_and_utils::Config;
use delivery_outbox::{DeliveryConfig, DeliveryQueue};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};
use transport_contract::TransportCell;
use transport_health_monitor::{HealthMonitor, MonitorConfig};

/// Run the daemon until ctrl-c.
pub async fn run_daemon(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        http_port = config.http_port,
        gateway_url = %config.gateway_url,
        send_timeout_ms = config.delivery.send_timeout_ms,
        max_retries = config.delivery.max_retries,
        max_reconnect_attempts = config.link.max_reconnect_attempts,
        "Configuration loaded"
    );

    // The queue and the monitor share one cell; only the monitor writes it.
    let cell = TransportCell::new();
    let queue = DeliveryQueue::new(delivery_config(&config), Arc::new(cell.clone()));

    let bootstrap = GatewayBootstrap::new(gateway_config(&config)?)?;
    let monitor = HealthMonitor::spawn(monitor_config(&config), Arc::new(bootstrap), cell);
    monitor.start()?;

    let router = build_router(AppState::new(queue, monitor.clone()));
    let listener = TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    info!(addr = %listener.local_addr()?, "Courier daemon started");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    monitor.shutdown();
    info!("Courier daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal, exiting..."),
        Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
    }
}

fn delivery_config(config: &Config) -> DeliveryConfig {
    DeliveryConfig {
        send_timeout: config.delivery.send_timeout(),
        max_retries: config.delivery.max_retries,
    }
}

fn monitor_config(config: &Config) -> MonitorConfig {
    MonitorConfig {
        liveness_interval: config.link.liveness_interval(),
        reconnect_base_delay: config.link.reconnect_base_delay(),
        max_reconnect_attempts: config.link.max_reconnect_attempts,
        restart_settle_delay: config.link.restart_settle_delay(),
    }
}

fn gateway_config(config: &Config) -> Result<GatewayConfig, Box<dyn std::error::Error>> {
    Ok(GatewayConfig {
        status_poll_interval: Duration::from_secs(config.gateway_status_poll_secs),
        ..GatewayConfig::new(config.gateway_url()?)
    })
}
