//! Netlink monitor thread.
//!
//! `udev::MonitorSocket` is not `Send`, so the socket is created on and never
//! leaves a dedicated OS thread. The thread drains the socket, sleeps for the
//! poll interval, and forwards owned notifications through a bounded tokio
//! channel.

use std::ffi::OsStr;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use udev::EventType;

use gopro_app::CancellationToken;
use gopro_domain::notification::DeviceNotification;

use crate::config::UdevConfig;
use crate::error::UdevError;
use crate::forward::{HANDOFF_CAPACITY, forward};

/// Start the monitor thread and wait until its socket is listening.
pub(crate) async fn open(
    config: &UdevConfig,
    cancel: CancellationToken,
) -> Result<mpsc::Receiver<DeviceNotification>, UdevError> {
    let (sender, receiver) = mpsc::channel(HANDOFF_CAPACITY);
    let (ready_tx, ready_rx) = oneshot::channel();
    let subsystem = config.subsystem.clone();
    let poll_interval = config.poll_interval();

    std::thread::Builder::new()
        .name("udev-monitor".to_string())
        .spawn(move || match listen(subsystem.as_deref()) {
            Ok(socket) => {
                let _ = ready_tx.send(Ok(()));
                run(&socket, &sender, &cancel, poll_interval);
            }
            Err(err) => {
                let _ = ready_tx.send(Err(err));
            }
        })
        .map_err(UdevError::Thread)?;

    ready_rx.await.map_err(|_| UdevError::ThreadGone)??;
    Ok(receiver)
}

fn listen(subsystem: Option<&str>) -> Result<udev::MonitorSocket, UdevError> {
    let mut builder = udev::MonitorBuilder::new().map_err(UdevError::Socket)?;
    if let Some(subsystem) = subsystem {
        builder = builder
            .match_subsystem(subsystem)
            .map_err(UdevError::Socket)?;
    }
    builder.listen().map_err(UdevError::Socket)
}

fn run(
    socket: &udev::MonitorSocket,
    sender: &mpsc::Sender<DeviceNotification>,
    cancel: &CancellationToken,
    poll_interval: Duration,
) {
    tracing::info!(poll_interval_ms = poll_interval.as_millis(), "udev monitor listening");
    while !cancel.is_cancelled() && !sender.is_closed() {
        if !forward(sender, socket.iter().map(|event| to_notification(&event))) {
            break;
        }
        std::thread::sleep(poll_interval);
    }
    tracing::info!("udev monitor stopped");
}

fn to_notification(event: &udev::Event) -> DeviceNotification {
    let properties = event.properties().map(|property| {
        (
            property.name().to_string_lossy().into_owned(),
            property.value().to_string_lossy().into_owned(),
        )
    });
    build_notification(
        action_name(event.event_type()),
        event.subsystem(),
        event.devpath(),
        event.sequence_number(),
        properties,
    )
}

fn action_name(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Add => "add",
        EventType::Remove => "remove",
        EventType::Change => "change",
        EventType::Bind => "bind",
        EventType::Unbind => "unbind",
        _ => "unknown",
    }
}

fn build_notification(
    action: &str,
    subsystem: Option<&OsStr>,
    devpath: &OsStr,
    sequence_number: u64,
    properties: impl IntoIterator<Item = (String, String)>,
) -> DeviceNotification {
    let mut builder = DeviceNotification::builder()
        .action(action)
        .devpath(devpath.to_string_lossy())
        .sequence_number(sequence_number);
    if let Some(subsystem) = subsystem {
        builder = builder.subsystem(subsystem.to_string_lossy());
    }
    for (name, value) in properties {
        builder = builder.property(name, value);
    }
    builder.build()
}
