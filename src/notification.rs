use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// Semantic result of an editing operation, rendered by whoever owns the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub outcome: Outcome,
    pub title: String,
    pub description: Option<String>,
}

impl Notification {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Succeeded,
            title: title.into(),
            description: None,
        }
    }

    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failed,
            title: title.into(),
            description: Some(description.into()),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failed
    }
}

pub trait Notifier {
    fn send(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, notification: Notification) {
        let description = notification.description.as_deref().unwrap_or("");
        match notification.outcome {
            Outcome::Succeeded => {
                tracing::info!(title = %notification.title, description, "notification")
            }
            Outcome::Failed => {
                tracing::warn!(title = %notification.title, description, "notification")
            }
        }
    }
}

/// Keeps every notification; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<Notification> {
        self.sent().pop()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, notification: Notification) {
        match self.sent.lock() {
            Ok(mut sent) => sent.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_shares_log_between_clones() {
        let notifier = RecordingNotifier::new();
        let handle = notifier.clone();
        handle.send(Notification::success("Image loaded successfully"));
        handle.send(Notification::failure("Cannot undo", "No more undo's available"));

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(!sent[0].is_failure());
        assert!(notifier.last().expect("last").is_failure());
    }
}
