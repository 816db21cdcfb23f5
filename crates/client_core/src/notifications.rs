//! Transient toasts surfaced to the user.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);
/// Longest lifetime a toast can have; larger configured TTLs are clamped.
pub const MAX_NOTIFICATION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
pub struct NotificationCenter {
    ttl: Duration,
    next_id: u64,
    items: VecDeque<Notification>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: ttl.min(MAX_NOTIFICATION_TTL),
            next_id: 1,
            items: VecDeque::new(),
        }
    }

    pub fn push(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) -> Notification {
        self.prune(now);
        let notification = Notification {
            id: self.next_id,
            kind,
            message: message.into(),
            expires_at: now.checked_add(self.ttl).unwrap_or(now),
        };
        self.next_id += 1;
        self.items.push_back(notification.clone());
        notification
    }

    pub fn prune(&mut self, now: Instant) {
        self.items.retain(|n| !n.is_expired(now));
    }

    /// Unexpired notifications, oldest first.
    pub fn active(&self, now: Instant) -> Vec<Notification> {
        self.items
            .iter()
            .filter(|n| !n.is_expired(now))
            .cloned()
            .collect()
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }
}

/// Cloneable handle to one [`NotificationCenter`], so the prompt can list and
/// dismiss toasts while the controller is busy with a remote call.
#[derive(Debug, Clone, Default)]
pub struct NotificationBoard {
    center: Arc<Mutex<NotificationCenter>>,
}

impl NotificationBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            center: Arc::new(Mutex::new(NotificationCenter::new(ttl))),
        }
    }

    pub fn push(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) -> Notification {
        self.center
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(kind, message, now)
    }

    pub fn active(&self, now: Instant) -> Vec<Notification> {
        self.center
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .active(now)
    }

    pub fn dismiss(&self, id: u64) -> bool {
        self.center
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .dismiss(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_expire_after_ttl() {
        let start = Instant::now();
        let mut center = NotificationCenter::new(Duration::from_secs(5));
        center.push(NotificationKind::Error, "boom", start);

        assert_eq!(center.active(start + Duration::from_millis(4_999)).len(), 1);
        assert!(center.active(start + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn dismiss_removes_only_target() {
        let now = Instant::now();
        let mut center = NotificationCenter::default();
        let first = center.push(NotificationKind::Error, "first", now);
        center.push(NotificationKind::Success, "second", now);

        assert!(center.dismiss(first.id));
        assert!(!center.dismiss(first.id));
        let remaining = center.active(now);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].message, "second");
    }

    #[test]
    fn push_prunes_expired_entries() {
        let start = Instant::now();
        let mut center = NotificationCenter::new(Duration::from_secs(1));
        center.push(NotificationKind::Error, "old", start);
        center.push(NotificationKind::Error, "new", start + Duration::from_secs(2));
        assert_eq!(center.items.len(), 1);
    }

    #[test]
    fn oversized_ttl_is_clamped() {
        let now = Instant::now();
        let mut center = NotificationCenter::new(Duration::from_secs(u64::MAX));
        let toast = center.push(NotificationKind::Error, "x", now);

        assert_eq!(toast.expires_at, now + MAX_NOTIFICATION_TTL);
        assert_eq!(center.active(now).len(), 1);
    }

    #[test]
    fn board_clones_share_one_center() {
        let now = Instant::now();
        let board = NotificationBoard::new(Duration::from_secs(5));
        let prompt = board.clone();
        let toast = board.push(NotificationKind::Success, "done", now);

        assert_eq!(prompt.active(now), vec![toast.clone()]);
        assert!(prompt.dismiss(toast.id));
        assert!(board.active(now).is_empty());
    }
}
