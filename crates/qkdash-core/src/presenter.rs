//! Ephemeral UI feedback: self-expiring notifications and a counted busy
//! indicator.
//!
//! Notifications expire after a fixed delay or on explicit dismissal; the
//! queue keeps insertion order with the newest first for display. The busy
//! indicator is a counter rather than a flag so overlapping workflows do
//! not clear each other's loading state.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a notification stays visible unless dismissed.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "ok",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

/// One queued notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    created: Instant,
}

/// Notification queue plus the counted loading indicator.
#[derive(Debug)]
pub struct Presenter {
    notifications: VecDeque<Notification>,
    next_id: u64,
    busy: usize,
    ttl: Duration,
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter {
    pub fn new() -> Self {
        Self::with_ttl(NOTIFICATION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            notifications: VecDeque::new(),
            next_id: 0,
            busy: 0,
            ttl,
        }
    }

    /// Enqueue a notification; returns its id for later dismissal.
    pub fn notify(&mut self, message: impl Into<String>, severity: Severity) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.notifications.push_front(Notification {
            id,
            message: message.into(),
            severity,
            created: Instant::now(),
        });
        id
    }

    /// Remove a notification before it expires.
    pub fn dismiss(&mut self, id: u64) {
        self.notifications.retain(|n| n.id != id);
    }

    /// Drop every notification older than the TTL as of `now`.
    pub fn expire(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.notifications
            .retain(|n| now.duration_since(n.created) < ttl);
    }

    /// Visible notifications, newest first.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }

    /// Mark one more operation in flight.
    pub fn begin_loading(&mut self) {
        self.busy += 1;
    }

    /// Mark one operation resolved. Never underflows.
    pub fn end_loading(&mut self) {
        self.busy = self.busy.saturating_sub(1);
    }

    /// True while any operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy > 0
    }
}
