//! User-facing notification queue
//!
//! Outcomes of network actions (login, sync, advice) are queued here with the
//! message shown to the user. Front ends drain the queue after each action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Messages shown to the user
pub mod messages {
    pub const SPREADSHEET_CREATE_FAILED: &str = "Gagal membuat Google Sheet otomatis.";
    pub const LOGIN_REQUIRED: &str = "Silakan login dengan Google terlebih dahulu.";
    pub const SYNC_SUCCEEDED: &str =
        "Sinkronisasi Berhasil! Data Anda sekarang ada di Google Sheets.";
    pub const SYNC_FAILED: &str =
        "Sesi login berakhir atau terjadi kesalahan. Silakan login kembali.";
    pub const LOGIN_FAILED: &str = "Login gagal. Silakan coba lagi.";
    pub const ADVICE_FAILED: &str = "Gagal mendapatkan saran dari AI. Silakan coba lagi nanti.";
    pub const BUSY: &str = "Proses sebelumnya masih berjalan.";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Error,
}

/// What triggered the notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Login,
    SpreadsheetCreation,
    Sync,
    Advice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: Level,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// FIFO of pending notifications
#[derive(Debug, Default)]
pub struct Notifications {
    queue: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: Level, kind: NotificationKind, message: &str) {
        match level {
            Level::Error => tracing::warn!(?kind, message, "Notification"),
            _ => tracing::info!(?kind, message, "Notification"),
        }
        self.queue.push(Notification {
            level,
            kind,
            message: message.to_string(),
            created_at: Utc::now(),
        });
    }

    pub fn error(&mut self, kind: NotificationKind, message: &str) {
        self.push(Level::Error, kind, message);
    }

    pub fn success(&mut self, kind: NotificationKind, message: &str) {
        self.push(Level::Success, kind, message);
    }

    pub fn pending(&self) -> &[Notification] {
        &self.queue
    }

    /// Take everything queued so far, oldest first
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_is_fifo_and_empties() {
        let mut n = Notifications::new();
        n.error(NotificationKind::Sync, messages::SYNC_FAILED);
        n.success(NotificationKind::Sync, messages::SYNC_SUCCEEDED);
        assert_eq!(n.pending().len(), 2);

        let drained = n.drain();
        assert_eq!(drained[0].level, Level::Error);
        assert_eq!(drained[1].message, messages::SYNC_SUCCEEDED);
        assert!(n.pending().is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let mut n = Notifications::new();
        n.error(NotificationKind::SpreadsheetCreation, messages::SPREADSHEET_CREATE_FAILED);
        let value = serde_json::to_value(&n.pending()[0]).unwrap();
        assert_eq!(value["level"], "error");
        assert_eq!(value["kind"], "spreadsheet_creation");
        assert_eq!(value["message"], "Gagal membuat Google Sheet otomatis.");
    }
}
