//! Hotplug monitor: turns a raw bus feed into a typed, filtered event stream.
//!
//! Each call to [`HotplugMonitor::listen`] opens one bus subscription and
//! spawns one task that classifies, resolves and hands events to the caller
//! one at a time. The task reads the next notification only after the
//! consumer has taken the previous event, so a slow consumer slows the
//! monitor down instead of growing a queue.
//!
//! ```text
//! Idle ──listen()──▶ Subscribing ──ok──▶ Active ──cancel──▶ Closed
//!                         │                  ▲  │
//!                         └──err──▶ (no stream)  └─ next notification
//! ```

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::{Stream, StreamExt as _};

use gopro_domain::classifier::EventFilter;
use gopro_domain::hotplug::HotplugEvent;
use gopro_domain::notification::DeviceNotification;
use gopro_domain::resolver;

use crate::CancellationToken;
use crate::ports::{BusEventSource, SubscriptionError};

/// Validated configuration for a [`HotplugMonitor`].
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    /// Event kinds reported to the consumer.
    pub filter: EventFilter,
}

impl MonitorConfig {
    #[must_use]
    pub fn new(filter: EventFilter) -> Self {
        Self { filter }
    }
}

/// Lifecycle of one `listen` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Subscribing,
    Active,
    /// Terminal.
    Closed,
}

/// Watches a bus source for supported cameras.
///
/// The monitor does not own the source's lifecycle; whoever built the source
/// keeps owning it.
pub struct HotplugMonitor<S> {
    source: S,
    config: MonitorConfig,
}

impl<S: BusEventSource> HotplugMonitor<S> {
    pub fn new(source: S, config: MonitorConfig) -> Self {
        Self { source, config }
    }

    /// Start watching the bus.
    ///
    /// The returned stream yields events in bus order and ends once `cancel`
    /// fires.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError`] when the bus subscription cannot be
    /// opened. No task is spawned in that case.
    #[tracing::instrument(skip_all, fields(filter = ?self.config.filter.kinds()))]
    pub async fn listen(
        &self,
        cancel: CancellationToken,
    ) -> Result<HotplugStream, SubscriptionError> {
        let (state_tx, state_rx) = watch::channel(MonitorState::Idle);
        transition(&state_tx, MonitorState::Subscribing);

        let subscription = match self.source.subscribe(cancel.clone()).await {
            Ok(subscription) => subscription,
            Err(err) => {
                tracing::error!(%err, "unable to subscribe to bus events");
                return Err(err);
            }
        };

        // Single slot: the task waits for it to drain before moving on.
        let (sender, receiver) = mpsc::channel(1);
        transition(&state_tx, MonitorState::Active);

        let task = tokio::spawn(run(
            subscription,
            self.config.filter.clone(),
            sender,
            cancel,
            state_tx,
        ));

        Ok(HotplugStream {
            receiver,
            state: state_rx,
            task,
        })
    }
}

/// Ordered stream of hotplug events produced by one `listen` call.
///
/// Single consumer. Ends (yields `None`) once the monitor task has closed.
/// Dropping the stream stops the monitor task.
#[derive(Debug)]
pub struct HotplugStream {
    receiver: mpsc::Receiver<HotplugEvent>,
    state: watch::Receiver<MonitorState>,
    task: JoinHandle<()>,
}

impl HotplugStream {
    /// Take the next event, waiting until one is available.
    ///
    /// Returns `None` once the monitor has closed and every handed-off event
    /// has been read.
    pub async fn recv(&mut self) -> Option<HotplugEvent> {
        self.receiver.recv().await
    }

    /// Current lifecycle state of the monitor task.
    #[must_use]
    pub fn state(&self) -> MonitorState {
        *self.state.borrow()
    }

    /// Wait until the monitor task reaches [`MonitorState::Closed`].
    pub async fn closed(&mut self) {
        // An error means the task is gone, which is closed as far as we care.
        let _ = self
            .state
            .wait_for(|state| *state == MonitorState::Closed)
            .await;
    }
}

impl Stream for HotplugStream {
    type Item = HotplugEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for HotplugStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<St>(
    mut subscription: St,
    filter: EventFilter,
    sender: mpsc::Sender<HotplugEvent>,
    cancel: CancellationToken,
    state: watch::Sender<MonitorState>,
) where
    St: Stream<Item = DeviceNotification> + Unpin,
{
    let cancelled = cancel.cancelled();
    tokio::pin!(cancelled);
    let mut source_open = true;

    loop {
        let notification = tokio::select! {
            biased;
            () = &mut cancelled => {
                tracing::debug!("cancellation requested");
                break;
            }
            next = subscription.next(), if source_open => match next {
                Some(notification) => notification,
                None => {
                    tracing::warn!("bus source ended; waiting for cancellation");
                    source_open = false;
                    continue;
                }
            },
        };

        let Some(event) = process(&filter, &notification) else {
            continue;
        };

        tracing::info!(
            kind = %event.kind,
            camera_id = %event.camera.id,
            address = ?event.camera.address,
            "camera hotplug detected"
        );

        tokio::select! {
            biased;
            () = &mut cancelled => {
                tracing::debug!("cancellation requested during delivery");
                break;
            }
            delivered = hand_off(&sender, event) => {
                if !delivered {
                    tracing::debug!("event consumer went away");
                    break;
                }
            }
        }
    }

    drop(sender);
    transition(&state, MonitorState::Closed);
}

/// Classify and resolve one notification.
fn process(filter: &EventFilter, notification: &DeviceNotification) -> Option<HotplugEvent> {
    if !filter.accepts(notification) {
        tracing::trace!(
            action = %notification.action,
            subsystem = ?notification.subsystem,
            devpath = %notification.devpath,
            "ignoring notification"
        );
        return None;
    }

    match resolver::resolve_event(notification) {
        Ok(event) => Some(event),
        Err(err) => {
            tracing::warn!(
                %err,
                sequence_number = notification.sequence_number,
                "dropping notification that could not be resolved"
            );
            None
        }
    }
}

/// Put `event` in the slot and wait for the consumer to take it.
///
/// Returns `false` when the consumer is gone.
async fn hand_off(sender: &mpsc::Sender<HotplugEvent>, event: HotplugEvent) -> bool {
    if sender.send(event).await.is_err() {
        return false;
    }
    // The slot frees up only once the consumer has received the event.
    sender.reserve().await.is_ok()
}

fn transition(state: &watch::Sender<MonitorState>, next: MonitorState) {
    let previous = state.send_replace(next);
    tracing::debug!(from = ?previous, to = ?next, "monitor state changed");
}
