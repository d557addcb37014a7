//! The notifier service: buffer ownership and flush scheduling.
//!
//! The service implements the actor pattern: the sink-facing transport holds
//! a cloneable handle and enqueues commands, while a single task owns the
//! buffer and processes commands sequentially. No locks guard the buffer and
//! a flush always works on a stable snapshot that later appends can never
//! touch.
//!
//! ```text
//!    Transport(s)
//!        │ commands via channel
//!        v
//!    NotifierService ──(timer tick | overflow | manual)──> flush
//!        │
//!        v  fire-and-forget task per batch
//!    MailSender
//! ```
//!
//! The flush timer is re-armed at the end of every flush, whether or not the
//! buffer held anything, so exactly one timer exists per notifier for its
//! whole lifetime.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::config::Config;
use crate::entry::LogEntry;
use crate::event_bus::Event;
use crate::mailer::MailSender;
use crate::message;

/// Commands accepted by the notifier service.
#[derive(Debug)]
pub enum NotifierCommand {
    /// Append one composed entry to the buffer.
    Record(LogEntry),

    /// Flush immediately, pre-empting the timer. Acknowledged once the
    /// snapshot is handed off — delivery itself stays asynchronous.
    Flush(oneshot::Sender<()>),
}

/// Cloneable producer handle for the notifier service.
#[derive(Clone, Debug)]
pub struct NotifierHandle {
    tx: mpsc::UnboundedSender<NotifierCommand>,
}

impl NotifierHandle {
    /// Enqueues one entry without blocking.
    ///
    /// # Errors
    ///
    /// Fails when the service has stopped.
    pub fn record(&self, entry: LogEntry) -> Result<(), mpsc::error::SendError<NotifierCommand>> {
        self.tx.send(NotifierCommand::Record(entry))
    }

    /// Triggers a flush and waits for the snapshot hand-off.
    pub async fn flush(&self) -> Result<(), String> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(NotifierCommand::Flush(ack_tx))
            .map_err(|e| format!("failed to send flush command: {e}"))?;

        ack_rx
            .await
            .map_err(|e| format!("failed to receive flush acknowledgment: {e}"))
    }
}

/// Service owning the buffer; spawn [`NotifierService::run`] as a task.
pub struct NotifierService {
    /// Shared transport configuration.
    config: Arc<Config>,
    /// Resolved sender address, fixed at construction.
    sender: String,
    /// Buffered entries, insertion order preserved. Exclusively owned: the
    /// service is the only component that ever reads or writes it.
    buffer: Vec<LogEntry>,
    /// Command channel from the handles.
    rx: mpsc::UnboundedReceiver<NotifierCommand>,
    /// Delivery collaborator.
    mailer: Arc<dyn MailSender>,
    /// Best-effort observer events.
    events: mpsc::Sender<Event>,
    /// Stops the service without draining the buffer.
    cancel_token: CancellationToken,
}

impl NotifierService {
    /// Creates the service and its handle.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        mailer: Arc<dyn MailSender>,
        events: mpsc::Sender<Event>,
    ) -> (Self, NotifierHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sender = config.sender();
        let buffer = Vec::with_capacity(config.max_buffer_items);

        let service = Self {
            config,
            sender,
            buffer,
            rx,
            mailer,
            events,
            cancel_token: CancellationToken::new(),
        };

        (service, NotifierHandle { tx })
    }

    /// Token that stops the service.
    ///
    /// Cancellation does not drain: entries still buffered at that point are
    /// lost, matching what abrupt process termination would do.
    #[must_use]
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Runs the service until cancellation or until every handle is dropped.
    ///
    /// The first timer flush fires one full interval after startup; every
    /// flush re-arms the timer for one interval from its own completion.
    pub async fn run(mut self) {
        debug!("MAIL | notifier service started");

        let period = self.config.max_buffer_time_span;
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(NotifierCommand::Record(entry)) => {
                        self.buffer.push(entry);
                        if self.buffer.len() >= self.config.max_buffer_items {
                            self.flush();
                            interval.reset();
                        }
                        let _ = self.events.try_send(Event::Logged);
                    }
                    Some(NotifierCommand::Flush(ack)) => {
                        self.flush();
                        interval.reset();
                        if ack.send(()).is_err() {
                            debug!("MAIL | flush acknowledgment receiver dropped");
                        }
                    }
                    None => {
                        debug!("MAIL | all handles dropped, stopping notifier service");
                        break;
                    }
                },
                _ = interval.tick() => {
                    self.flush();
                    interval.reset();
                }
                () = self.cancel_token.cancelled() => {
                    debug!("MAIL | notifier service shutting down");
                    break;
                }
            }
        }
    }

    /// Swaps the buffer for a fresh one and hands the snapshot off for
    /// delivery. An empty buffer flushes to nothing.
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let snapshot = std::mem::replace(
            &mut self.buffer,
            Vec::with_capacity(self.config.max_buffer_items),
        );
        let count = snapshot.len();
        let Some(email) = message::compose(&self.sender, &self.config.to, &snapshot) else {
            return;
        };

        debug!("MAIL | flushing {} buffered log entries", count);

        // One attempt per batch: a failed delivery is logged and dropped,
        // never retried or re-buffered.
        let mailer = Arc::clone(&self.mailer);
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&email).await {
                error!("MAIL | failed to deliver log notification: {}", e);
                let _ = events.try_send(Event::DeliveryFailed);
            }
        });

        let _ = self.events.try_send(Event::Flushed { count });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::mailer::DeliveryError;
    use crate::message::Email;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};
    use tracing_test::traced_test;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<Email>>,
        fail_next: AtomicBool,
    }

    impl RecordingMailer {
        fn sent(&self) -> Vec<Email> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MailSender for RecordingMailer {
        async fn send(&self, email: &Email) -> Result<(), DeliveryError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(DeliveryError::Smtp("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    fn create_test_config() -> Config {
        Config {
            to: "ops@example.com".to_string(),
            from: Some("notifier@example.com".to_string()),
            max_buffer_time_span: Duration::from_secs(60),
            ..Config::default()
        }
    }

    fn create_test_entry(message: &str) -> LogEntry {
        LogEntry::compose(Level::Error, message, None)
    }

    fn spawn_service(config: Config) -> (NotifierHandle, Arc<RecordingMailer>, CancellationToken) {
        let mailer = Arc::new(RecordingMailer::default());
        let (_bus, events) = crate::event_bus::EventBus::run();
        let (service, handle) = NotifierService::new(Arc::new(config), mailer.clone(), events);
        let cancel_token = service.cancel_token();
        tokio::spawn(service.run());
        (handle, mailer, cancel_token)
    }

    async fn wait_for_deliveries(mailer: &RecordingMailer, count: usize) {
        let settled = async {
            while mailer.sent.lock().unwrap().len() < count {
                sleep(Duration::from_millis(10)).await;
            }
        };
        timeout(Duration::from_secs(2), settled)
            .await
            .expect("timed out waiting for delivery");
    }

    #[tokio::test]
    async fn test_manual_flush_delivers_single_entry_verbatim() {
        let (handle, mailer, _token) = spawn_service(create_test_config());

        handle.record(create_test_entry("disk full")).unwrap();
        handle.flush().await.unwrap();
        wait_for_deliveries(&mailer, 1).await;

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].from, "notifier@example.com");
        assert_eq!(sent[0].to, "ops@example.com");
        assert_eq!(sent[0].subject, "error: disk full");
        assert_eq!(sent[0].html, "disk full\n\r\n\r");
    }

    #[tokio::test]
    async fn test_manual_flush_on_empty_buffer_delivers_nothing() {
        let (handle, mailer, _token) = spawn_service(create_test_config());

        handle.flush().await.unwrap();
        sleep(Duration::from_millis(50)).await;

        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_overflow_triggers_flush_without_timer() {
        let config = Config {
            max_buffer_items: 2,
            max_buffer_time_span: Duration::from_secs(3600),
            ..create_test_config()
        };
        let (handle, mailer, _token) = spawn_service(config);

        handle.record(create_test_entry("disk full")).unwrap();
        handle.record(create_test_entry("disk full again")).unwrap();
        wait_for_deliveries(&mailer, 1).await;

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "messages: 2");
        let first = sent[0].html.find("disk full").unwrap();
        let second = sent[0].html.find("disk full again").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_buffer_restarts_empty_after_overflow_flush() {
        let config = Config {
            max_buffer_items: 2,
            max_buffer_time_span: Duration::from_secs(3600),
            ..create_test_config()
        };
        let (handle, mailer, _token) = spawn_service(config);

        handle.record(create_test_entry("first")).unwrap();
        handle.record(create_test_entry("second")).unwrap();
        wait_for_deliveries(&mailer, 1).await;

        // The next cycle starts from an empty buffer.
        handle.record(create_test_entry("third")).unwrap();
        handle.flush().await.unwrap();
        wait_for_deliveries(&mailer, 2).await;

        let sent = mailer.sent();
        assert_eq!(sent[1].subject, "error: third");
    }

    #[tokio::test]
    async fn test_timer_flushes_without_manual_trigger() {
        let config = Config {
            max_buffer_time_span: Duration::from_millis(100),
            ..create_test_config()
        };
        let (handle, mailer, _token) = spawn_service(config);

        handle.record(create_test_entry("slow burn")).unwrap();
        wait_for_deliveries(&mailer, 1).await;

        assert_eq!(mailer.sent()[0].subject, "error: slow burn");
    }

    #[tokio::test]
    async fn test_timer_keeps_rearming_across_cycles() {
        let config = Config {
            max_buffer_time_span: Duration::from_millis(50),
            ..create_test_config()
        };
        let (handle, mailer, _token) = spawn_service(config);

        handle.record(create_test_entry("first cycle")).unwrap();
        wait_for_deliveries(&mailer, 1).await;

        handle.record(create_test_entry("second cycle")).unwrap();
        wait_for_deliveries(&mailer, 2).await;

        let sent = mailer.sent();
        assert_eq!(sent[0].subject, "error: first cycle");
        assert_eq!(sent[1].subject, "error: second cycle");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_delivery_failure_is_logged_and_dropped() {
        let (handle, mailer, _token) = spawn_service(create_test_config());
        mailer.fail_next.store(true, Ordering::SeqCst);

        handle.record(create_test_entry("lost batch")).unwrap();
        handle.flush().await.unwrap();
        sleep(Duration::from_millis(50)).await;

        // The batch is gone: not delivered, not re-buffered.
        assert!(mailer.sent().is_empty());
        assert!(logs_contain("failed to deliver log notification"));

        // The next cycle is unaffected.
        handle.record(create_test_entry("next batch")).unwrap();
        handle.flush().await.unwrap();
        wait_for_deliveries(&mailer, 1).await;
        assert_eq!(mailer.sent()[0].subject, "error: next batch");
    }

    #[tokio::test]
    async fn test_cancellation_stops_service_without_draining() {
        let (handle, mailer, token) = spawn_service(create_test_config());

        handle.record(create_test_entry("doomed")).unwrap();
        sleep(Duration::from_millis(20)).await;
        token.cancel();
        sleep(Duration::from_millis(20)).await;

        // Buffered entry is lost and the service no longer accepts commands.
        assert!(mailer.sent().is_empty());
        assert!(handle.flush().await.is_err());
    }

    #[tokio::test]
    async fn test_service_stops_when_all_handles_drop() {
        let mailer = Arc::new(RecordingMailer::default());
        let (_bus, events) = crate::event_bus::EventBus::run();
        let (service, handle) =
            NotifierService::new(Arc::new(create_test_config()), mailer.clone(), events);
        let task = tokio::spawn(service.run());

        drop(handle);

        timeout(Duration::from_secs(1), task)
            .await
            .expect("service did not stop after handles dropped")
            .unwrap();
    }

    #[tokio::test]
    async fn test_events_observable_through_bus() {
        let mailer = Arc::new(RecordingMailer::default());
        let (mut bus, events) = crate::event_bus::EventBus::run();
        let (service, handle) =
            NotifierService::new(Arc::new(create_test_config()), mailer.clone(), events);
        tokio::spawn(service.run());

        handle.record(create_test_entry("observed")).unwrap();
        let logged = timeout(Duration::from_secs(1), bus.rx.recv()).await.unwrap();
        assert_eq!(logged, Some(Event::Logged));

        handle.flush().await.unwrap();
        let flushed = timeout(Duration::from_secs(1), bus.rx.recv()).await.unwrap();
        assert_eq!(flushed, Some(Event::Flushed { count: 1 }));
    }
}
