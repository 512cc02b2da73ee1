use std::time::{Duration, Instant};

pub const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub severity: Severity,
    shown_at: Instant,
}

impl Toast {
    pub fn remaining(&self, now: Instant) -> Duration {
        TOAST_DURATION.saturating_sub(now.saturating_duration_since(self.shown_at))
    }
}

/// Single notification slot. A new toast replaces the current one outright.
#[derive(Debug, Default)]
pub struct Toasts {
    current: Option<Toast>,
}

impl Toasts {
    pub fn show(&mut self, message: impl Into<String>, severity: Severity) {
        self.show_at(message, severity, Instant::now());
    }

    pub fn show_at(&mut self, message: impl Into<String>, severity: Severity, at: Instant) {
        self.current = Some(Toast {
            message: message.into(),
            severity,
            shown_at: at,
        });
    }

    /// The toast still inside its display window at `now`, if any.
    pub fn visible(&self, now: Instant) -> Option<&Toast> {
        self.current
            .as_ref()
            .filter(|toast| !toast.remaining(now).is_zero())
    }

    /// Last toast shown, regardless of whether it has expired.
    #[cfg(test)]
    pub fn latest(&self) -> Option<&Toast> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_expires_after_three_seconds() {
        let start = Instant::now();
        let mut toasts = Toasts::default();
        toasts.show_at("Saved", Severity::Success, start);

        assert!(toasts.visible(start + Duration::from_millis(2999)).is_some());
        assert!(toasts.visible(start + TOAST_DURATION).is_none());
        assert_eq!(toasts.latest().map(|t| t.message.as_str()), Some("Saved"));
    }

    #[test]
    fn newer_toast_replaces_visible_one() {
        let start = Instant::now();
        let mut toasts = Toasts::default();
        toasts.show_at("first", Severity::Success, start);
        toasts.show_at("second", Severity::Error, start + Duration::from_secs(1));

        let toast = toasts.visible(start + Duration::from_secs(3)).unwrap();
        assert_eq!(toast.message, "second");
        assert_eq!(toast.severity, Severity::Error);
        assert_eq!(
            toast.remaining(start + Duration::from_secs(3)),
            Duration::from_secs(1)
        );
    }
}
