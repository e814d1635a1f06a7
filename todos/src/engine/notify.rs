//! Error banner with a delayed re-show timer.
//!
//! `signal` hides the banner, swaps the message and arms a single deadline;
//! when the deadline passes, `tick` flips the banner back to visible. Only
//! one deadline exists at a time: a new signal replaces the pending one.
//!
//! [`NotifyMode::Queued`] is an opt-in alternative that keeps later
//! messages in a bounded backlog instead of overwriting the current one.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

/// Default delay before a signalled banner is shown again.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(3000);

/// How concurrent signals share the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyMode {
    /// One slot; the latest signal wins.
    #[default]
    SingleSlot,
    /// Signals arriving while a message is active wait in a backlog of at
    /// most `capacity` entries (oldest dropped first).
    Queued {
        /// Maximum number of waiting messages.
        capacity: usize,
    },
}

/// Notification banner state.
#[derive(Debug)]
pub struct Notifier {
    message: String,
    visible: bool,
    deadline: Option<Instant>,
    delay: Duration,
    mode: NotifyMode,
    backlog: VecDeque<String>,
}

impl Notifier {
    /// Creates an idle notifier: no message, visibility flag set.
    #[must_use]
    pub const fn new(delay: Duration, mode: NotifyMode) -> Self {
        Self {
            message: String::new(),
            visible: true,
            deadline: None,
            delay,
            mode,
            backlog: VecDeque::new(),
        }
    }

    /// Current message text (empty until the first signal).
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Current visibility flag.
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }

    /// Whether the banner should be drawn.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.visible && !self.message.is_empty()
    }

    /// Whether a re-show deadline is armed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Messages waiting behind the current one (queued mode only).
    #[must_use]
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Raises `message`.
    pub fn signal(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.mode {
            NotifyMode::Queued { capacity } if self.is_active() => {
                if capacity == 0 {
                    return;
                }
                if self.backlog.len() >= capacity {
                    self.backlog.pop_front();
                }
                self.backlog.push_back(message);
            }
            _ => self.show(message),
        }
    }

    /// Explicit close by the user.
    ///
    /// Schedules nothing. A deadline armed by an earlier signal is left in
    /// place. In queued mode the next waiting message takes over the slot.
    pub fn dismiss(&mut self) {
        self.visible = false;
        if let NotifyMode::Queued { .. } = self.mode
            && let Some(next) = self.backlog.pop_front()
        {
            self.show(next);
        }
    }

    /// Fires the deadline if it has passed. Returns `true` if it fired.
    pub fn tick(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                self.visible = true;
                true
            }
            _ => false,
        }
    }

    fn show(&mut self, message: String) {
        tracing::debug!(%message, "notification raised");
        self.visible = false;
        self.message = message;
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// A message is occupying the slot: waiting to show or showing.
    fn is_active(&self) -> bool {
        self.deadline.is_some() || self.is_shown()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY, NotifyMode::SingleSlot)
    }
}
