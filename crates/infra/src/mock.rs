//! # テスト用モック実装
//!
//! ユースケーステストで使用するインメモリモックリポジトリと
//! 記録型モックメーラー。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! oshirase-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oshirase_domain::{
    attendee::Attendee,
    notification::{EmailMessage, MailError, NotificationContent, NotificationId},
};

use crate::{
    error::InfraError,
    mailer::Mailer,
    repository::{
        AttendeeRepository,
        DeliveryLogRepository,
        NotificationDelivery,
        NotificationRepository,
    },
};

// ===== MockNotificationRepository =====

/// 完了記録（モックが記録する UPDATE の内容）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub id:             NotificationId,
    pub completed_date: DateTime<Utc>,
    pub status:         String,
}

#[derive(Clone, Default)]
pub struct MockNotificationRepository {
    contents:    Arc<Mutex<HashMap<i64, NotificationContent>>>,
    completions: Arc<Mutex<Vec<CompletionRecord>>>,
}

impl MockNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_notification(&self, id: NotificationId, content: NotificationContent) {
        self.contents.lock().unwrap().insert(id.value(), content);
    }

    /// 記録された完了記録を取得する
    pub fn completions(&self) -> Vec<CompletionRecord> {
        self.completions.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationRepository for MockNotificationRepository {
    async fn find_content_by_id(
        &self,
        id: NotificationId,
    ) -> Result<Option<NotificationContent>, InfraError> {
        Ok(self.contents.lock().unwrap().get(&id.value()).cloned())
    }

    async fn mark_completed(
        &self,
        id: NotificationId,
        completed_date: DateTime<Utc>,
        status: &str,
    ) -> Result<bool, InfraError> {
        if !self.contents.lock().unwrap().contains_key(&id.value()) {
            return Ok(false);
        }

        self.completions.lock().unwrap().push(CompletionRecord {
            id,
            completed_date,
            status: status.to_string(),
        });
        Ok(true)
    }
}

// ===== MockAttendeeRepository =====

#[derive(Clone, Default)]
pub struct MockAttendeeRepository {
    attendees: Arc<Mutex<Vec<Attendee>>>,
}

impl MockAttendeeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_attendee(&self, attendee: Attendee) {
        self.attendees.lock().unwrap().push(attendee);
    }
}

#[async_trait]
impl AttendeeRepository for MockAttendeeRepository {
    async fn list_all(&self) -> Result<Vec<Attendee>, InfraError> {
        Ok(self.attendees.lock().unwrap().clone())
    }
}

// ===== MockDeliveryLogRepository =====

#[derive(Clone, Default)]
pub struct MockDeliveryLogRepository {
    deliveries: Arc<Mutex<Vec<NotificationDelivery>>>,
}

impl MockDeliveryLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録された配信結果を取得する
    pub fn deliveries(&self) -> Vec<NotificationDelivery> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryLogRepository for MockDeliveryLogRepository {
    async fn insert(&self, delivery: &NotificationDelivery) -> Result<(), InfraError> {
        self.deliveries.lock().unwrap().push(delivery.clone());
        Ok(())
    }
}

// ===== MockMailer =====

/// 送信したメールを記録するモックメーラー
///
/// `fail_for()` で指定した宛先への送信は `MailError::SendFailed` を返す。
/// 部分失敗シナリオのテストに使用する。
#[derive(Clone, Default)]
pub struct MockMailer {
    sent:      Arc<Mutex<Vec<EmailMessage>>>,
    fail_for:  Arc<Mutex<HashSet<String>>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定した宛先への送信を失敗させる
    pub fn fail_for(&self, address: impl Into<String>) {
        self.fail_for.lock().unwrap().insert(address.into());
    }

    /// 送信に成功したメールを取得する
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), MailError> {
        if self.fail_for.lock().unwrap().contains(&email.to) {
            return Err(MailError::SendFailed(format!(
                "モック送信失敗: {}",
                email.to
            )));
        }

        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_mailerが送信メッセージを記録する() {
        let mailer = MockMailer::new();
        let email = EmailMessage {
            to:        "a@x.com".to_string(),
            subject:   "件名".to_string(),
            html_body: "<p>本文</p>".to_string(),
            text_body: "本文".to_string(),
        };

        mailer.send_email(&email).await.unwrap();

        let sent = mailer.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@x.com");
    }

    #[tokio::test]
    async fn mock_mailerが指定宛先への送信を失敗させる() {
        let mailer = MockMailer::new();
        mailer.fail_for("b@x.com");

        let email = EmailMessage {
            to:        "b@x.com".to_string(),
            subject:   "件名".to_string(),
            html_body: "<p>本文</p>".to_string(),
            text_body: "本文".to_string(),
        };

        let result = mailer.send_email(&email).await;
        assert!(matches!(result, Err(MailError::SendFailed(_))));
        assert!(mailer.sent_emails().is_empty());
    }

    #[tokio::test]
    async fn mock_notification_repositoryが完了記録を保持する() {
        let repo = MockNotificationRepository::new();
        let id = NotificationId::new(42);
        repo.add_notification(
            id,
            NotificationContent {
                message: "Event starts soon".to_string(),
                subject: "Welcome".to_string(),
            },
        );

        let updated = repo
            .mark_completed(id, Utc::now(), "Notified 2 attendees")
            .await
            .unwrap();

        assert!(updated);
        let completions = repo.completions();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].status, "Notified 2 attendees");
    }

    #[tokio::test]
    async fn mock_notification_repositoryは存在しないidの完了記録を拒否する() {
        let repo = MockNotificationRepository::new();

        let updated = repo
            .mark_completed(NotificationId::new(999), Utc::now(), "Notified 0 attendees")
            .await
            .unwrap();

        assert!(!updated);
        assert!(repo.completions().is_empty());
    }
}
