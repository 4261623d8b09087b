//! # NotificationRepository
//!
//! 通知レコードの読み取りと完了記録を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **読み取りは本文のみ**: ディスパッチに必要な message / subject だけを取得
//! - **完了記録は 1 文**: completed_date と status を単一 UPDATE で書き込む。
//!   更新行数 0（レコード消失）は呼び出し元が NotFound として扱えるよう
//!   bool で返す

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oshirase_domain::notification::{NotificationContent, NotificationId};
use sqlx::PgPool;

use crate::error::InfraError;

/// 通知リポジトリトレイト
///
/// 通知レコードの永続化操作を定義する。
/// インフラ層で具体的な実装を提供し、ユースケース層から利用する。
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// ID で通知本文を検索
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(content))`: 通知が見つかった場合
    /// - `Ok(None)`: 通知が見つからない場合（呼び出し元で NotFound に変換する）
    /// - `Err(_)`: データベースエラー
    async fn find_content_by_id(
        &self,
        id: NotificationId,
    ) -> Result<Option<NotificationContent>, InfraError>;

    /// 完了記録を書き込む
    ///
    /// `completed_date` と `status` を設定する。
    ///
    /// # 戻り値
    ///
    /// - `Ok(true)`: 1 行更新された
    /// - `Ok(false)`: 対象行が存在しなかった
    async fn mark_completed(
        &self,
        id: NotificationId,
        completed_date: DateTime<Utc>,
        status: &str,
    ) -> Result<bool, InfraError>;
}

/// PostgreSQL 実装の NotificationRepository
#[derive(Debug, Clone)]
pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct NotificationContentRow {
    message: String,
    subject: String,
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(notification_id = %id))]
    async fn find_content_by_id(
        &self,
        id: NotificationId,
    ) -> Result<Option<NotificationContent>, InfraError> {
        let row = sqlx::query_as::<_, NotificationContentRow>(
            r#"
            SELECT message, subject
            FROM notification
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| NotificationContent {
            message: r.message,
            subject: r.subject,
        }))
    }

    #[tracing::instrument(skip_all, level = "debug", fields(notification_id = %id))]
    async fn mark_completed(
        &self,
        id: NotificationId,
        completed_date: DateTime<Utc>,
        status: &str,
    ) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE notification
            SET completed_date = $1, status = $2
            WHERE id = $3
            "#,
        )
        .bind(completed_date)
        .bind(status)
        .bind(id.value())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresNotificationRepository>();
    }
}
