use std::time::{Duration, Instant};

use crate::config::ToastConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn icon(self) -> &'static str {
        match self {
            ToastKind::Success => "✔",
            ToastKind::Error => "✖",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Visible,
    Exiting,
    Hidden,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

/// Single-slot notifier. A new toast replaces the current one and restarts
/// its clock; nothing is queued.
#[derive(Debug)]
pub struct ToastNotifier {
    visible_for: Duration,
    exit_for: Duration,
    current: Option<Toast>,
}

impl Default for ToastNotifier {
    fn default() -> Self {
        Self::from_config(&ToastConfig::default())
    }
}

impl ToastNotifier {
    pub fn new(visible_for: Duration, exit_for: Duration) -> Self {
        Self {
            visible_for,
            exit_for,
            current: None,
        }
    }

    pub fn from_config(config: &ToastConfig) -> Self {
        Self::new(config.visible(), config.exit())
    }

    pub fn show<S: Into<String>>(&mut self, message: S, kind: ToastKind, now: Instant) {
        let message = message.into();
        tracing::debug!(?kind, %message, "toast shown");
        self.current = Some(Toast {
            message,
            kind,
            shown_at: now,
        });
    }

    pub fn phase(&self, now: Instant) -> ToastPhase {
        let Some(toast) = &self.current else {
            return ToastPhase::Hidden;
        };
        let elapsed = now.saturating_duration_since(toast.shown_at);
        if elapsed < self.visible_for {
            ToastPhase::Visible
        } else if elapsed < self.visible_for + self.exit_for {
            ToastPhase::Exiting
        } else {
            ToastPhase::Hidden
        }
    }

    /// The toast to draw, if any, with its phase.
    pub fn current(&self, now: Instant) -> Option<(&Toast, ToastPhase)> {
        match self.phase(now) {
            ToastPhase::Hidden => None,
            phase => self.current.as_ref().map(|toast| (toast, phase)),
        }
    }

    /// Drops an expired toast. Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.current.is_some() && self.phase(now) == ToastPhase::Hidden {
            self.current = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_moves_through_visible_exiting_hidden() {
        let start = Instant::now();
        let mut toast = ToastNotifier::default();
        assert_eq!(toast.phase(start), ToastPhase::Hidden);

        toast.show("Log created", ToastKind::Success, start);
        assert_eq!(toast.phase(start), ToastPhase::Visible);
        assert_eq!(
            toast.phase(start + Duration::from_millis(2499)),
            ToastPhase::Visible
        );
        assert_eq!(
            toast.phase(start + Duration::from_millis(2500)),
            ToastPhase::Exiting
        );
        assert_eq!(
            toast.phase(start + Duration::from_millis(2899)),
            ToastPhase::Exiting
        );
        assert_eq!(
            toast.phase(start + Duration::from_millis(2900)),
            ToastPhase::Hidden
        );
    }

    #[test]
    fn second_show_replaces_and_restarts() {
        let start = Instant::now();
        let mut toast = ToastNotifier::default();
        toast.show("first", ToastKind::Success, start);
        let later = start + Duration::from_millis(2600);
        toast.show("second", ToastKind::Error, later);

        let (current, phase) = toast
            .current(later + Duration::from_millis(100))
            .expect("toast visible");
        assert_eq!(current.message, "second");
        assert_eq!(current.kind, ToastKind::Error);
        assert_eq!(phase, ToastPhase::Visible);
    }

    #[test]
    fn tick_clears_expired_toast_once() {
        let start = Instant::now();
        let mut toast = ToastNotifier::new(Duration::from_millis(10), Duration::from_millis(5));
        toast.show("bye", ToastKind::Success, start);
        assert!(!toast.tick(start + Duration::from_millis(12)));
        assert!(toast.tick(start + Duration::from_millis(15)));
        assert!(!toast.tick(start + Duration::from_millis(20)));
        assert!(toast.current(start + Duration::from_millis(20)).is_none());
    }
}
