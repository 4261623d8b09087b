//! # SQS キューコンシューマ
//!
//! 通知トリガーメッセージの受信・削除を担当する。
//!
//! ## 設計方針
//!
//! - **ロングポーリング**: `wait_time_seconds` で空ポーリングを抑える
//! - **削除は明示的**: メッセージの削除（ACK）は処理結果を見た呼び出し元が
//!   判断する。削除しなければ可視性タイムアウト後に再配信され、
//!   キュー側のデッドレター設定が再試行回数を抑える

use aws_sdk_sqs::types::Message;

use crate::error::InfraError;

/// SQS キューコンシューマ
///
/// `aws_sdk_sqs::Client` をラップし、受信・削除操作を提供する。
#[derive(Clone, Debug)]
pub struct QueueConsumer {
    client:            aws_sdk_sqs::Client,
    queue_url:         String,
    max_messages:      i32,
    wait_time_seconds: i32,
}

impl QueueConsumer {
    /// 新しいコンシューマインスタンスを作成
    ///
    /// # 引数
    ///
    /// - `client`: SQS クライアント
    /// - `queue_url`: 購読するキューの URL
    /// - `max_messages`: 1 回の受信で取得する最大メッセージ数（1〜10）
    /// - `wait_time_seconds`: ロングポーリングの待機秒数（0〜20）
    pub fn new(
        client: aws_sdk_sqs::Client,
        queue_url: String,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> Self {
        Self {
            client,
            queue_url,
            max_messages,
            wait_time_seconds,
        }
    }

    /// キューからメッセージを受信する
    ///
    /// メッセージがない場合は空の Vec を返す。
    #[tracing::instrument(skip(self))]
    pub async fn receive_messages(&self) -> Result<Vec<Message>, InfraError> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .wait_time_seconds(self.wait_time_seconds)
            .max_number_of_messages(self.max_messages)
            .send()
            .await
            .map_err(|e| InfraError::queue(format!("メッセージ受信に失敗: {e}")))?;

        Ok(output.messages.unwrap_or_default())
    }

    /// メッセージをキューから削除する（ACK）
    #[tracing::instrument(skip(self, message), fields(message_id = ?message.message_id))]
    pub async fn delete_message(&self, message: &Message) -> Result<(), InfraError> {
        let Some(receipt_handle) = message.receipt_handle.as_ref() else {
            tracing::warn!("受信ハンドルのないメッセージは削除できません");
            return Err(InfraError::queue("受信ハンドルがありません"));
        };

        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| InfraError::queue(format!("メッセージ削除に失敗: {e}")))?;

        Ok(())
    }
}
