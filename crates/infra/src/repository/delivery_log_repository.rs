//! # DeliveryLogRepository
//!
//! 参加者ごとの配信結果の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **fire-and-forget ログ**: 送信成功・失敗どちらも記録する。
//!   記録の失敗がディスパッチ全体を失敗させることはない

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oshirase_domain::notification::{DeliveryStatus, NotificationDeliveryId, NotificationId};
use sqlx::PgPool;

use crate::error::InfraError;

/// 配信結果（リポジトリ INSERT 用データ型）
#[derive(Debug, Clone)]
pub struct NotificationDelivery {
    pub id: NotificationDeliveryId,
    pub notification_id: NotificationId,
    pub recipient_email: String,
    pub subject: String,
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
    pub sent_at: DateTime<Utc>,
}

/// 配信ログリポジトリトレイト
#[async_trait]
pub trait DeliveryLogRepository: Send + Sync {
    /// 配信結果を挿入する
    async fn insert(&self, delivery: &NotificationDelivery) -> Result<(), InfraError>;
}

/// PostgreSQL 実装の DeliveryLogRepository
#[derive(Debug, Clone)]
pub struct PostgresDeliveryLogRepository {
    pool: PgPool,
}

impl PostgresDeliveryLogRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryLogRepository for PostgresDeliveryLogRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn insert(&self, delivery: &NotificationDelivery) -> Result<(), InfraError> {
        let status: &str = delivery.status.into();

        sqlx::query(
            r#"
            INSERT INTO notification_deliveries (
                id, notification_id, recipient_email,
                subject, status, error_message, sent_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(delivery.id.as_uuid())
        .bind(delivery.notification_id.value())
        .bind(&delivery.recipient_email)
        .bind(&delivery.subject)
        .bind(status)
        .bind(&delivery.error_message)
        .bind(delivery.sent_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresDeliveryLogRepository>();
    }
}
