//! # goprod
//!
//! GoPro webcam daemon.
//!
//! Composition root that wires the bus source, the hotplug monitor and the
//! webcam controller together.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise logging
//! - Pick the bus source (udev or virtual)
//! - Start every supported camera as it connects
//! - On SIGINT/SIGTERM, close the monitor and stop every started camera
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use gopro_adapter_udev::UdevBus;
use gopro_adapter_webcam_http::HttpWebcamController;
use gopro_app::CancellationToken;
use gopro_app::ports::{BusEventSource, SubscriptionError};
use gopro_app::services::camera_supervisor::CameraSupervisor;
use gopro_app::services::hotplug_monitor::{HotplugMonitor, MonitorConfig};
use gopro_domain::classifier::EventFilter;
use tracing_subscriber::EnvFilter;

use crate::config::{BusKind, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    tracing::info!(bus = %config.bus.kind, "goprod starting");

    let controller = HttpWebcamController::new(&config.webcam)?;
    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let filter = config.monitor.events.clone();
    match config.bus.kind {
        BusKind::Udev => {
            let bus = UdevBus::new(config.bus.udev.clone());
            supervise(bus, controller, filter, cancel).await?;
        }
        BusKind::Virtual => {
            let (bus, handle) = gopro_adapter_virtual::channel();
            for devpath in &config.bus.virtual_bus.plug {
                handle.plug(devpath)?;
            }
            supervise(bus, controller, filter, cancel).await?;
        }
    }

    tracing::info!("goprod stopped");
    Ok(())
}

/// Run the monitor and supervisor until `cancel` fires, then stop every
/// started camera.
async fn supervise<S: BusEventSource>(
    bus: S,
    controller: HttpWebcamController,
    filter: EventFilter,
    cancel: CancellationToken,
) -> Result<(), SubscriptionError> {
    let monitor = HotplugMonitor::new(bus, MonitorConfig::new(filter));
    let events = monitor.listen(cancel).await?;

    let mut supervisor = CameraSupervisor::new(controller);
    let stopped = supervisor.run(events).await;
    tracing::info!(stopped, "cameras stopped");
    Ok(())
}

async fn cancel_on_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received SIGINT"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
    cancel.cancel();
}
