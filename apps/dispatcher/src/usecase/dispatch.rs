//! # 通知ディスパッチユースケース
//!
//! 通知本文の取得 → 参加者ロスターの取得 → 参加者ごとのメール送信 →
//! 完了記録、の一連の処理を統合する。
//!
//! ## 設計方針
//!
//! - **送信失敗の個別捕捉**: 参加者 1 名分の送信失敗でループを止めない。
//!   成否を集計し、完了ステータスには成功数を記録する
//! - **配信ログは fire-and-forget**: ログの記録失敗はディスパッチ全体を
//!   失敗させない
//! - **再送信の抑止はしない**: 同一通知 ID の再配信では送信済みの参加者にも
//!   再度送信される（冪等性は提供しない）

use std::sync::Arc;

use oshirase_domain::{
    attendee::Attendee,
    clock::Clock,
    notification::{
        DeliveryStatus,
        MailError,
        NotificationContent,
        NotificationDeliveryId,
        NotificationId,
        completion_status,
    },
};
use oshirase_infra::{
    mailer::Mailer,
    repository::{
        AttendeeRepository,
        DeliveryLogRepository,
        NotificationDelivery,
        NotificationRepository,
    },
};
use oshirase_shared::{event_log::event, log_business_event};

use super::NoticeRenderer;
use crate::error::DispatchError;

/// ディスパッチ結果の集計
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// ロスター件数
    pub attendee_count: usize,
    /// 送信成功数
    pub notified:       usize,
    /// 送信失敗数
    pub failed:         usize,
}

/// 通知ディスパッチユースケース
pub struct DispatchUseCase<NR, AR, DL>
where
    NR: NotificationRepository,
    AR: AttendeeRepository,
    DL: DeliveryLogRepository,
{
    notification_repo: NR,
    attendee_repo:     AR,
    delivery_log_repo: DL,
    mailer:            Arc<dyn Mailer>,
    renderer:          NoticeRenderer,
    clock:             Arc<dyn Clock>,
}

impl<NR, AR, DL> DispatchUseCase<NR, AR, DL>
where
    NR: NotificationRepository,
    AR: AttendeeRepository,
    DL: DeliveryLogRepository,
{
    pub fn new(
        notification_repo: NR,
        attendee_repo: AR,
        delivery_log_repo: DL,
        mailer: Arc<dyn Mailer>,
        renderer: NoticeRenderer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notification_repo,
            attendee_repo,
            delivery_log_repo,
            mailer,
            renderer,
            clock,
        }
    }

    /// 通知 ID に対するディスパッチを実行する
    ///
    /// 1. 通知本文を取得（0 行なら NotFound）
    /// 2. 参加者ロスターを全件取得
    /// 3. 参加者ごとにレンダリング・送信・配信ログ記録（失敗しても継続）
    /// 4. completed_date と成功数入りステータスで完了記録
    #[tracing::instrument(skip(self), fields(notification_id = %id))]
    pub async fn dispatch(&self, id: NotificationId) -> Result<DispatchOutcome, DispatchError> {
        let content = self
            .notification_repo
            .find_content_by_id(id)
            .await?
            .ok_or(DispatchError::NotificationNotFound { id })?;

        let attendees = self.attendee_repo.list_all().await?;
        tracing::info!(attendee_count = attendees.len(), "参加者への配信を開始");

        let mut notified = 0usize;
        let mut failed = 0usize;
        for attendee in &attendees {
            match self.send_to_attendee(id, &content, attendee).await {
                Ok(()) => notified += 1,
                Err(_) => failed += 1,
            }
        }

        let status = completion_status(notified);
        let completed_date = self.clock.now();
        let updated = self
            .notification_repo
            .mark_completed(id, completed_date, &status)
            .await?;
        if !updated {
            return Err(DispatchError::NotificationNotFound { id });
        }

        tracing::info!(notified, failed, status = %status, "完了記録を書き込みました");

        Ok(DispatchOutcome {
            attendee_count: attendees.len(),
            notified,
            failed,
        })
    }

    /// 参加者 1 名分のレンダリング・送信・配信ログ記録を行う
    ///
    /// レンダリング失敗も送信失敗と同様に配信ログへ記録する。
    async fn send_to_attendee(
        &self,
        id: NotificationId,
        content: &NotificationContent,
        attendee: &Attendee,
    ) -> Result<(), MailError> {
        let result = match self.renderer.render(content, attendee) {
            Ok(email) => self.mailer.send_email(&email).await,
            Err(e) => Err(e),
        };

        let (status, error_message) = match &result {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.entity_type = event::entity_type::DELIVERY_LOG,
                    event.entity_id = %id,
                    event.result = event::result::SUCCESS,
                    notification.recipient = %attendee.email,
                    "通知メール送信成功"
                );
                (DeliveryStatus::Sent, None)
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.entity_type = event::entity_type::DELIVERY_LOG,
                    event.entity_id = %id,
                    event.result = event::result::FAILURE,
                    notification.recipient = %attendee.email,
                    error = %e,
                    "通知メール送信失敗"
                );
                (DeliveryStatus::Failed, Some(e.to_string()))
            }
        };

        let delivery = NotificationDelivery {
            id: NotificationDeliveryId::new(),
            notification_id: id,
            recipient_email: attendee.email.clone(),
            subject: content.subject.clone(),
            status,
            error_message,
            sent_at: self.clock.now(),
        };

        if let Err(e) = self.delivery_log_repo.insert(&delivery).await {
            tracing::error!(error = %e, "配信ログの記録に失敗");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use oshirase_domain::clock::FixedClock;
    use oshirase_infra::mock::{
        MockAttendeeRepository,
        MockDeliveryLogRepository,
        MockMailer,
        MockNotificationRepository,
    };
    use pretty_assertions::assert_eq;

    use super::*;

    /// テスト用の固定日時
    fn test_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    struct Fixture {
        notification_repo: MockNotificationRepository,
        attendee_repo:     MockAttendeeRepository,
        delivery_log_repo: MockDeliveryLogRepository,
        mailer:            MockMailer,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                notification_repo: MockNotificationRepository::new(),
                attendee_repo:     MockAttendeeRepository::new(),
                delivery_log_repo: MockDeliveryLogRepository::new(),
                mailer:            MockMailer::new(),
            }
        }

        fn make_usecase(
            &self,
        ) -> DispatchUseCase<
            MockNotificationRepository,
            MockAttendeeRepository,
            MockDeliveryLogRepository,
        > {
            DispatchUseCase::new(
                self.notification_repo.clone(),
                self.attendee_repo.clone(),
                self.delivery_log_repo.clone(),
                Arc::new(self.mailer.clone()),
                NoticeRenderer::new().unwrap(),
                Arc::new(FixedClock::new(test_now())),
            )
        }
    }

    fn seed_welcome_notification(fixture: &Fixture) -> NotificationId {
        let id = NotificationId::new(42);
        fixture.notification_repo.add_notification(
            id,
            NotificationContent {
                message: "Event starts soon".to_string(),
                subject: "Welcome".to_string(),
            },
        );
        id
    }

    fn seed_attendees(fixture: &Fixture) {
        fixture.attendee_repo.add_attendee(Attendee {
            email:      "a@x.com".to_string(),
            first_name: "Ann".to_string(),
        });
        fixture.attendee_repo.add_attendee(Attendee {
            email:      "b@x.com".to_string(),
            first_name: "Bob".to_string(),
        });
    }

    #[tokio::test]
    async fn 参加者全員に1通ずつ送信し成功数入りのステータスを記録する() {
        let fixture = Fixture::new();
        let id = seed_welcome_notification(&fixture);
        seed_attendees(&fixture);
        let usecase = fixture.make_usecase();

        let outcome = usecase.dispatch(id).await.unwrap();

        assert_eq!(
            outcome,
            DispatchOutcome {
                attendee_count: 2,
                notified:       2,
                failed:         0,
            }
        );

        // 参加者ごとに件名・宛名が正しいメールが 1 通ずつ
        let sent = fixture.mailer.sent_emails();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "a@x.com");
        assert_eq!(sent[0].subject, "Welcome");
        assert!(sent[0].html_body.contains("Dear Ann,"));
        assert!(
            sent[0]
                .html_body
                .contains("<strong>Event starts soon</strong>")
        );
        assert_eq!(sent[1].to, "b@x.com");
        assert!(sent[1].html_body.contains("Dear Bob,"));

        // 完了記録: 固定時刻と成功数入りステータス
        let completions = fixture.notification_repo.completions();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].id, id);
        assert_eq!(completions[0].completed_date, test_now());
        assert_eq!(completions[0].status, "Notified 2 attendees");
    }

    #[tokio::test]
    async fn 参加者0件では送信せずステータスは0件を記録する() {
        let fixture = Fixture::new();
        let id = seed_welcome_notification(&fixture);
        let usecase = fixture.make_usecase();

        let outcome = usecase.dispatch(id).await.unwrap();

        assert_eq!(outcome.attendee_count, 0);
        assert_eq!(outcome.notified, 0);
        assert!(fixture.mailer.sent_emails().is_empty());

        let completions = fixture.notification_repo.completions();
        assert_eq!(completions[0].status, "Notified 0 attendees");
    }

    #[tokio::test]
    async fn 存在しない通知idはnot_foundになり送信は行われない() {
        let fixture = Fixture::new();
        seed_attendees(&fixture);
        let usecase = fixture.make_usecase();

        let err = usecase.dispatch(NotificationId::new(999)).await.unwrap_err();

        assert!(matches!(
            err,
            DispatchError::NotificationNotFound { id } if id == NotificationId::new(999)
        ));
        assert!(fixture.mailer.sent_emails().is_empty());
        assert!(fixture.notification_repo.completions().is_empty());
    }

    #[tokio::test]
    async fn 送信失敗があってもループは継続し成功数のみ記録する() {
        let fixture = Fixture::new();
        let id = seed_welcome_notification(&fixture);
        seed_attendees(&fixture);
        fixture.mailer.fail_for("a@x.com");
        let usecase = fixture.make_usecase();

        let outcome = usecase.dispatch(id).await.unwrap();

        assert_eq!(outcome.notified, 1);
        assert_eq!(outcome.failed, 1);

        // 失敗した宛先の後の参加者にも送信されている
        let sent = fixture.mailer.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "b@x.com");

        // ステータスは成功数のみ
        let completions = fixture.notification_repo.completions();
        assert_eq!(completions[0].status, "Notified 1 attendees");
    }

    #[tokio::test]
    async fn 配信ログに参加者ごとの成否が記録される() {
        let fixture = Fixture::new();
        let id = seed_welcome_notification(&fixture);
        seed_attendees(&fixture);
        fixture.mailer.fail_for("b@x.com");
        let usecase = fixture.make_usecase();

        usecase.dispatch(id).await.unwrap();

        let deliveries = fixture.delivery_log_repo.deliveries();
        assert_eq!(deliveries.len(), 2);

        assert_eq!(deliveries[0].recipient_email, "a@x.com");
        assert_eq!(deliveries[0].status, DeliveryStatus::Sent);
        assert!(deliveries[0].error_message.is_none());
        assert_eq!(deliveries[0].subject, "Welcome");
        assert_eq!(deliveries[0].sent_at, test_now());

        assert_eq!(deliveries[1].recipient_email, "b@x.com");
        assert_eq!(deliveries[1].status, DeliveryStatus::Failed);
        assert!(deliveries[1].error_message.is_some());
    }

    #[tokio::test]
    async fn 再ディスパッチでは送信済みの参加者にも再送信される() {
        // 冪等性は提供しない（ドキュメント化された既知のギャップ）。
        // 再配信後の挙動が変わっていないことを固定する
        let fixture = Fixture::new();
        let id = seed_welcome_notification(&fixture);
        seed_attendees(&fixture);
        let usecase = fixture.make_usecase();

        usecase.dispatch(id).await.unwrap();
        usecase.dispatch(id).await.unwrap();

        assert_eq!(fixture.mailer.sent_emails().len(), 4);
        assert_eq!(fixture.notification_repo.completions().len(), 2);
    }
}
