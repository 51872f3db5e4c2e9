use std::{
    collections::VecDeque,
    fmt,
    time::{
        Duration,
        Instant,
    },
};
use tracing::{
    error,
    info,
    warn,
};

pub const INSTALL_PROMPT_DURATION: Duration = Duration::from_secs(5);
pub const CONFIRM_PROMPT_DURATION: Duration = Duration::from_secs(10);
const MAX_NOTIFICATIONS: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub expires_at: Instant,
}

/// Transient toasts, oldest first.
#[derive(Clone, Debug)]
pub struct Notifications {
    items: VecDeque<Notification>,
    default_ttl: Duration,
}

impl Notifications {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            default_ttl,
        }
    }

    pub fn push(&mut self, level: Level, message: impl Into<String>) {
        self.push_for(level, message, self.default_ttl);
    }

    pub fn push_for(&mut self, level: Level, message: impl Into<String>, ttl: Duration) {
        let message = message.into();
        match level {
            Level::Error => error!(%level, "{message}"),
            Level::Warning => warn!(%level, "{message}"),
            Level::Info | Level::Success => info!(%level, "{message}"),
        }
        self.items.push_back(Notification {
            level,
            message,
            expires_at: Instant::now() + ttl,
        });
        while self.items.len() > MAX_NOTIFICATIONS {
            self.items.pop_front();
        }
    }

    /// Drops expired entries; returns whether anything was removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.expires_at > now);
        before != self.items.len()
    }

    pub fn active(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.back()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
