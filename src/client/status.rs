use std::fmt;
use tokio::time::{Duration, Instant};

pub const AUTO_HIDE_AFTER: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub shown_at: Instant,
}

impl StatusMessage {
    ///errors stay until replaced, everything else fades after [`AUTO_HIDE_AFTER`]
    pub fn is_visible_at(&self, now: Instant) -> bool {
        match self.kind {
            StatusKind::Error => true,
            StatusKind::Success | StatusKind::Warning => {
                now.saturating_duration_since(self.shown_at) < AUTO_HIDE_AFTER
            }
        }
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            StatusKind::Success => "ok",
            StatusKind::Warning => "..",
            StatusKind::Error => "!!",
        };
        write!(f, "[{tag}] {}", self.text)
    }
}

///One place on screen where status messages show up, newest replacing oldest.
#[derive(Debug, Clone, Default)]
pub struct StatusSlot(Option<StatusMessage>);

impl StatusSlot {
    pub fn show(&mut self, kind: StatusKind, text: impl Into<String>, now: Instant) {
        self.0 = Some(StatusMessage {
            kind,
            text: text.into(),
            shown_at: now,
        });
    }

    pub fn visible(&self, now: Instant) -> Option<&StatusMessage> {
        self.0.as_ref().filter(|message| message.is_visible_at(now))
    }
}
