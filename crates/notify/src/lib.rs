//! Transient user notifications for the mono banking client
//!
//! A [`NotificationSink`] is a cheap, cloneable handle to one shared list of
//! messages. Any holder can append; the view layer reads the list or subscribes
//! to new entries. Each entry carries its expiry time as its id and a periodic
//! sweep drops the ones that have passed.

mod clock;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub use clock::{Clock, ManualClock, SystemClock};

/// How long a notification stays visible
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(4);

/// How often expired notifications are swept
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Error,
}

/// A message shown to the user until it expires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Expiry time in milliseconds since the Unix epoch, unique within a sink
    pub id: i64,
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.id < now_millis
    }
}

/// Sink settings
#[derive(Debug, Clone)]
pub struct NotificationOptions {
    pub lifetime: Duration,
    pub sweep_interval: Duration,
    /// Buffer of the subscriber channel; slow subscribers lose the oldest entries
    pub channel_capacity: usize,
}

impl Default for NotificationOptions {
    fn default() -> Self {
        Self {
            lifetime: DEFAULT_LIFETIME,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            channel_capacity: 64,
        }
    }
}

impl NotificationOptions {
    pub fn with_lifetime(mut self, value: Duration) -> Self {
        self.lifetime = value;
        self
    }

    pub fn with_sweep_interval(mut self, value: Duration) -> Self {
        self.sweep_interval = value;
        self
    }
}

#[derive(Debug, Default)]
struct Entries {
    list: Vec<Notification>,
    last_id: i64,
}

#[derive(Debug)]
struct Inner {
    entries: RwLock<Entries>,
    sender: broadcast::Sender<Notification>,
    clock: Arc<dyn Clock>,
    options: NotificationOptions,
}

/// Shared handle to the notification list
#[derive(Debug, Clone)]
pub struct NotificationSink {
    inner: Arc<Inner>,
}

impl Default for NotificationSink {
    fn default() -> Self {
        Self::new(NotificationOptions::default())
    }
}

impl NotificationSink {
    pub fn new(options: NotificationOptions) -> Self {
        Self::with_clock(options, Arc::new(SystemClock))
    }

    pub fn with_clock(options: NotificationOptions, clock: Arc<dyn Clock>) -> Self {
        let (sender, _) = broadcast::channel(options.channel_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(Entries::default()),
                sender,
                clock,
                options,
            }),
        }
    }

    pub fn options(&self) -> &NotificationOptions {
        &self.inner.options
    }

    /// Add a notification that expires one lifetime from now
    pub fn append(&self, message: impl Into<String>, kind: NotificationKind) -> Notification {
        let now = self.inner.clock.now_millis();
        let expires_at = now + self.inner.options.lifetime.as_millis() as i64;

        let notification = {
            let mut entries = self.inner.entries.write().unwrap_or_else(|e| e.into_inner());
            let id = expires_at.max(entries.last_id + 1);
            entries.last_id = id;

            let notification = Notification {
                id,
                message: message.into(),
                kind,
            };
            entries.list.push(notification.clone());
            notification
        };

        debug!("Notification {:?}: {}", notification.kind, notification.message);
        // having no subscribers is normal
        self.inner.sender.send(notification.clone()).ok();
        notification
    }

    pub fn info(&self, message: impl Into<String>) -> Notification {
        self.append(message, NotificationKind::Info)
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.append(message, NotificationKind::Error)
    }

    /// Append after `delay` from a detached task.
    ///
    /// Must be called inside a tokio runtime. The task is not cancelled when the
    /// caller goes away.
    pub fn notify_after(
        &self,
        delay: Duration,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> JoinHandle<()> {
        let sink = self.clone();
        let message = message.into();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sink.append(message, kind);
        })
    }

    /// Drop every notification whose expiry time has passed
    pub fn sweep(&self) -> usize {
        let now = self.inner.clock.now_millis();
        let mut entries = self.inner.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.list.len();
        entries.list.retain(|n| !n.is_expired(now));
        let removed = before - entries.list.len();
        if removed > 0 {
            trace!("Swept {} expired notification(s)", removed);
        }
        removed
    }

    /// Run [`sweep`](Self::sweep) every sweep interval.
    ///
    /// The task ends by itself once every handle to this sink is dropped.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.options.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(inner) => {
                        NotificationSink { inner }.sweep();
                    }
                    None => break,
                }
            }
        })
    }

    /// Currently visible notifications, oldest first
    pub fn visible(&self) -> Vec<Notification> {
        let entries = self.inner.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.list.clone()
    }

    pub fn len(&self) -> usize {
        let entries = self.inner.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receive every notification appended from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.inner.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: i64 = 1_700_000_000_000;

    fn manual_sink() -> (ManualClock, NotificationSink) {
        let clock = ManualClock::new(START);
        let sink = NotificationSink::with_clock(NotificationOptions::default(), Arc::new(clock.clone()));
        (clock, sink)
    }

    #[test]
    fn test_append_tags_with_expiry() {
        let (_clock, sink) = manual_sink();

        let n = sink.error("Error fetching cards data");

        assert_eq!(n.id, START + 4_000);
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(sink.visible(), vec![n]);
    }

    #[test]
    fn test_ids_stay_unique_within_one_millisecond() {
        let (_clock, sink) = manual_sink();

        let first = sink.info("one");
        let second = sink.info("two");

        assert_eq!(second.id, first.id + 1);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_sweep_keeps_until_expiry_passes() {
        let (clock, sink) = manual_sink();
        sink.info("old");
        clock.advance(Duration::from_secs(2));
        sink.info("new");

        clock.advance(Duration::from_secs(2));
        assert_eq!(sink.sweep(), 0);

        clock.advance(Duration::from_millis(1));
        assert_eq!(sink.sweep(), 1);
        assert_eq!(sink.visible()[0].message, "new");

        clock.advance(Duration::from_secs(2));
        assert_eq!(sink.sweep(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_subscribers_receive_appends() {
        let (_clock, sink) = manual_sink();
        let mut rx = sink.subscribe();

        let n = sink.info("hello");

        assert_eq!(rx.try_recv().unwrap(), n);
    }

    #[test]
    fn test_clones_share_the_list() {
        let (_clock, sink) = manual_sink();
        let other = sink.clone();

        other.error("from a loader");

        assert_eq!(sink.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_after_waits_for_delay() {
        let (_clock, sink) = manual_sink();

        let handle = sink.notify_after(Duration::from_millis(100), "late", NotificationKind::Error);
        assert!(sink.is_empty());

        handle.await.unwrap();
        assert_eq!(sink.visible()[0].message, "late");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_within_one_interval_of_expiry() {
        let (clock, sink) = manual_sink();
        sink.error("boom");
        let handle = sink.spawn_sweeper();

        for second in 1..=5 {
            clock.advance(Duration::from_secs(1));
            tokio::time::advance(Duration::from_secs(1)).await;
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }

            if second <= 4 {
                assert_eq!(sink.len(), 1, "still visible after {}s", second);
            } else {
                assert!(sink.is_empty(), "expired entry not swept");
            }
        }

        handle.abort();
    }
}
