//! # AttendeeRepository
//!
//! 参加者ロスターの読み取りを担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **全件取得**: ロスターは通知 ID で絞り込まない。すべての通知は
//!   `attendee` テーブルの全員に配信される（ブロードキャスト仕様）。
//!   参加者と通知を関連付けるテーブルはスキーマに存在しない
//! - **結果順**: 送信は取得した結果順に行われる

use async_trait::async_trait;
use oshirase_domain::attendee::Attendee;
use sqlx::PgPool;

use crate::error::InfraError;

/// 参加者リポジトリトレイト
#[async_trait]
pub trait AttendeeRepository: Send + Sync {
    /// 参加者全件を取得する
    ///
    /// 0 件の場合は空の Vec を返す。
    async fn list_all(&self) -> Result<Vec<Attendee>, InfraError>;
}

/// PostgreSQL 実装の AttendeeRepository
#[derive(Debug, Clone)]
pub struct PostgresAttendeeRepository {
    pool: PgPool,
}

impl PostgresAttendeeRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AttendeeRow {
    email:      String,
    first_name: String,
}

#[async_trait]
impl AttendeeRepository for PostgresAttendeeRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn list_all(&self) -> Result<Vec<Attendee>, InfraError> {
        let rows = sqlx::query_as::<_, AttendeeRow>(
            r#"
            SELECT email, first_name
            FROM attendee
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Attendee {
                email:      r.email,
                first_name: r.first_name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PostgresAttendeeRepository>();
    }
}
