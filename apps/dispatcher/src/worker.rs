//! # キューワーカー
//!
//! SQS からメッセージを受信し、1 件ずつディスパッチユースケースに渡す。
//!
//! ## 設計方針
//!
//! - **逐次処理**: メッセージは受信順に 1 件ずつ処理する。並列化はしない
//! - **削除は結果を見てから**: 成功時は削除（ACK）。失敗時はエラー種別と
//!   `requeue_on_failure` 設定から後処理方針を導く
//! - **受信エラーで落ちない**: 受信自体の失敗はログに残して待機後に再試行する

use std::time::Duration;

use aws_sdk_sqs::types::Message;
use oshirase_domain::notification::NotificationId;
use oshirase_infra::{
    queue::QueueConsumer,
    repository::{AttendeeRepository, DeliveryLogRepository, NotificationRepository},
};
use oshirase_shared::{event_log::event, log_business_event};

use crate::{
    error::MessageDisposition,
    usecase::DispatchUseCase,
};

/// 受信エラー後の待機時間
const RECEIVE_RETRY_DELAY: Duration = Duration::from_secs(5);

/// キューワーカー
pub struct Worker<NR, AR, DL>
where
    NR: NotificationRepository,
    AR: AttendeeRepository,
    DL: DeliveryLogRepository,
{
    consumer: QueueConsumer,
    usecase: DispatchUseCase<NR, AR, DL>,
    requeue_on_failure: bool,
}

impl<NR, AR, DL> Worker<NR, AR, DL>
where
    NR: NotificationRepository,
    AR: AttendeeRepository,
    DL: DeliveryLogRepository,
{
    pub fn new(
        consumer: QueueConsumer,
        usecase: DispatchUseCase<NR, AR, DL>,
        requeue_on_failure: bool,
    ) -> Self {
        Self {
            consumer,
            usecase,
            requeue_on_failure,
        }
    }

    /// 受信ループを開始する
    ///
    /// このメソッドは戻らない。停止はプロセスのシグナルハンドリング側で行う。
    pub async fn run(&self) {
        tracing::info!("キューの購読を開始します");

        loop {
            let messages = match self.consumer.receive_messages().await {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::error!(error = %e, "メッセージ受信に失敗。待機後に再試行します");
                    tokio::time::sleep(RECEIVE_RETRY_DELAY).await;
                    continue;
                }
            };

            for message in &messages {
                self.process_message(message).await;
            }
        }
    }

    /// メッセージ 1 件を処理する
    ///
    /// 本文のパース → ディスパッチ → 後処理方針の適用、の順に進む。
    /// パース失敗はどの I/O よりも先に検出され、メッセージは破棄される。
    #[tracing::instrument(skip_all, fields(message_id = ?message.message_id))]
    async fn process_message(&self, message: &Message) {
        let body = message.body.as_deref().unwrap_or_default();

        let id = match NotificationId::parse(body) {
            Ok(id) => id,
            Err(e) => {
                // ポイズンメッセージ: 再配信しても直らない
                tracing::error!(error = %e, "メッセージ本文のパースに失敗");
                log_business_event!(
                    event.category = event::category::QUEUE,
                    event.action = event::action::MESSAGE_DISCARDED,
                    event.result = event::result::FAILURE,
                    "不正なキューメッセージを破棄"
                );
                self.delete_quietly(message).await;
                return;
            }
        };

        tracing::info!(notification_id = %id, "キューメッセージを受信");

        match self.usecase.dispatch(id).await {
            Ok(outcome) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::DISPATCH_COMPLETED,
                    event.entity_type = event::entity_type::NOTIFICATION,
                    event.entity_id = %id,
                    event.result = event::result::SUCCESS,
                    dispatch.notified = outcome.notified,
                    dispatch.failed = outcome.failed,
                    "ディスパッチ完了"
                );
                self.delete_quietly(message).await;
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::DISPATCH_FAILED,
                    event.entity_type = event::entity_type::NOTIFICATION,
                    event.entity_id = %id,
                    event.result = event::result::FAILURE,
                    error = %e,
                    "ディスパッチ失敗"
                );
                match e.disposition() {
                    MessageDisposition::Discard => self.delete_quietly(message).await,
                    MessageDisposition::Retry if self.requeue_on_failure => {
                        // 削除しない。可視性タイムアウト後に再配信される
                        tracing::warn!(notification_id = %id, "メッセージを再配信に委ねます");
                    }
                    MessageDisposition::Retry => {
                        // 再配信無効時は失敗してもメッセージを ACK する
                        self.delete_quietly(message).await;
                    }
                }
            }
        }
    }

    /// メッセージを削除する。削除失敗はログに残すのみ
    async fn delete_quietly(&self, message: &Message) {
        if let Err(e) = self.consumer.delete_message(message).await {
            tracing::error!(error = %e, "メッセージ削除に失敗");
        }
    }
}
