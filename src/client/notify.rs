//! Transient feedback messages.
//!
//! The surface owns every live notification. Each one moves through three
//! phases:
//!
//! ```text
//! show() ──▶ Entering ──tick──▶ Visible ──duration──▶ Leaving ──300ms──▶ removed
//! ```
//!
//! A notification with a zero duration stays `Visible` until it is
//! dismissed through its [`NotificationId`].

use std::time::{Duration, Instant};

use crate::format::printable;

/// How long a notification stays up when no duration is given.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

/// Time between leaving the visible state and removal.
pub const EXIT_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✗",
            NotificationKind::Warning => "!",
            NotificationKind::Info => "i",
        }
    }
}

/// Handle returned by [`NotificationSurface::show`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Visible,
    Leaving,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
    /// Zero means persistent.
    pub duration: Duration,
    pub created_at: Instant,
    pub phase: Phase,
}

impl Notification {
    pub fn is_persistent(&self) -> bool {
        self.duration.is_zero()
    }

    fn leave_at(&self) -> Option<Instant> {
        (!self.is_persistent()).then(|| self.created_at + self.duration)
    }

    fn remove_at(&self) -> Option<Instant> {
        self.leave_at().map(|t| t + EXIT_DELAY)
    }
}

/// The single container of live notifications.
#[derive(Debug, Default)]
pub struct NotificationSurface {
    // Created on first use.
    container: Option<Vec<Notification>>,
    next_id: u64,
}

impl NotificationSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn container(&mut self) -> &mut Vec<Notification> {
        self.container.get_or_insert_with(Vec::new)
    }

    /// Whether the container has been created yet.
    pub fn has_container(&self) -> bool {
        self.container.is_some()
    }

    /// Show a notification now.
    pub fn show(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration: Duration,
    ) -> NotificationId {
        self.show_at(message, kind, duration, Instant::now())
    }

    pub fn show_at(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration: Duration,
        now: Instant,
    ) -> NotificationId {
        self.next_id += 1;
        let id = NotificationId(self.next_id);
        self.container().push(Notification {
            id,
            message: printable(&message.into()),
            kind,
            duration,
            created_at: now,
            phase: Phase::Entering,
        });
        id
    }

    pub fn info(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationKind::Info, DEFAULT_DURATION)
    }

    pub fn success(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationKind::Success, DEFAULT_DURATION)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationKind::Warning, DEFAULT_DURATION)
    }

    pub fn error(&mut self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationKind::Error, DEFAULT_DURATION)
    }

    /// Remove a notification immediately, whatever its phase.
    ///
    /// Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let Some(container) = self.container.as_mut() else {
            return false;
        };
        let before = container.len();
        container.retain(|n| n.id != id);
        container.len() != before
    }

    /// Dismiss the most recently shown notification.
    pub fn dismiss_newest(&mut self) -> Option<NotificationId> {
        let id = self.iter().last()?.id;
        self.dismiss(id);
        Some(id)
    }

    /// Advance every notification to its phase at `now`.
    ///
    /// Called once per rendered frame, after drawing, so a new notification
    /// is painted in its entering state exactly once.
    pub fn tick(&mut self, now: Instant) {
        let Some(container) = self.container.as_mut() else {
            return;
        };
        container.retain(|n| n.remove_at().is_none_or(|t| now < t));
        for n in container.iter_mut() {
            match n.leave_at() {
                Some(t) if now >= t => n.phase = Phase::Leaving,
                _ if n.phase == Phase::Entering => n.phase = Phase::Visible,
                _ => {}
            }
        }
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.get(id).is_some()
    }

    /// Live notifications, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.container.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.container.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_container_is_created_lazily_once() {
        let mut surface = NotificationSurface::new();
        assert!(!surface.has_container());
        surface.tick(Instant::now());
        assert!(!surface.has_container());

        surface.info("one");
        surface.info("two");
        assert!(surface.has_container());
        assert_eq!(surface.len(), 2);
    }

    #[test]
    fn test_enters_then_becomes_visible_on_next_tick() {
        let mut surface = NotificationSurface::new();
        let t0 = Instant::now();
        let id = surface.show_at("hello", NotificationKind::Info, DEFAULT_DURATION, t0);
        assert_eq!(surface.get(id).unwrap().phase, Phase::Entering);

        surface.tick(t0);
        assert_eq!(surface.get(id).unwrap().phase, Phase::Visible);
    }

    #[test]
    fn test_two_phase_removal() {
        let mut surface = NotificationSurface::new();
        let t0 = Instant::now();
        let d = Duration::from_millis(3000);
        let id = surface.show_at("bye", NotificationKind::Success, d, t0);

        surface.tick(t0 + d - MS);
        assert_eq!(surface.get(id).unwrap().phase, Phase::Visible);

        surface.tick(t0 + d);
        assert_eq!(surface.get(id).unwrap().phase, Phase::Leaving);

        surface.tick(t0 + d + EXIT_DELAY - MS);
        assert!(surface.contains(id));

        surface.tick(t0 + d + EXIT_DELAY + MS);
        assert!(!surface.contains(id));
    }

    #[test]
    fn test_late_tick_removes_without_lingering() {
        let mut surface = NotificationSurface::new();
        let t0 = Instant::now();
        let id = surface.show_at("x", NotificationKind::Info, 10 * MS, t0);
        surface.tick(t0 + Duration::from_secs(5));
        assert!(!surface.contains(id));
    }

    #[test]
    fn test_zero_duration_persists_until_dismissed() {
        let mut surface = NotificationSurface::new();
        let t0 = Instant::now();
        let id = surface.show_at("sticky", NotificationKind::Warning, Duration::ZERO, t0);

        surface.tick(t0 + Duration::from_secs(3600));
        assert_eq!(surface.get(id).unwrap().phase, Phase::Visible);

        assert!(surface.dismiss(id));
        assert!(!surface.contains(id));
        assert!(!surface.dismiss(id));
    }

    #[test]
    fn test_dismiss_targets_only_its_handle() {
        let mut surface = NotificationSurface::new();
        let a = surface.error("a");
        let b = surface.error("a");
        assert_ne!(a, b);

        surface.dismiss(a);
        assert!(surface.contains(b));
        assert_eq!(surface.dismiss_newest(), Some(b));
        assert!(surface.is_empty());
        assert_eq!(surface.dismiss_newest(), None);
    }

    #[test]
    fn test_message_text_is_made_printable() {
        let mut surface = NotificationSurface::new();
        surface.error("Refresh failed:\x1b[31m boom\x07");
        assert_eq!(
            surface.iter().next().unwrap().message,
            "Refresh failed:[31m boom"
        );
    }

    #[test]
    fn test_no_cap_on_concurrent_notifications() {
        let mut surface = NotificationSurface::new();
        for i in 0..100 {
            surface.info(format!("n{i}"));
        }
        assert_eq!(surface.len(), 100);
    }
}
