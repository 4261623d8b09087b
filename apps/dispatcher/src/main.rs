//! # Notification Dispatcher
//!
//! キュートリガーで起動する参加者通知ワーカー。
//!
//! ## 役割
//!
//! SQS キューのメッセージ本文（通知 ID）を受け取り、以下を実行する:
//!
//! - **通知本文の取得**: PostgreSQL の `notification` テーブルから
//!   message / subject を取得
//! - **参加者への配信**: `attendee` テーブル全員に 1 通ずつメール送信
//! - **完了記録**: `completed_date` と成功数入り `status` を書き戻す
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  SQS Queue   │────▶│  Dispatcher  │────▶│   SendGrid   │
//! └──────────────┘     └──────┬───────┘     └──────────────┘
//!                             │
//!                      ┌──────▼───────┐
//!                      │  PostgreSQL  │
//!                      └──────────────┘
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `POSTGRES_URL` | **Yes** | データベースホスト |
//! | `POSTGRES_DB` | **Yes** | データベース名 |
//! | `POSTGRES_USER` | **Yes** | 接続ユーザー |
//! | `POSTGRES_PW` | **Yes** | 接続パスワード |
//! | `QUEUE_URL` | **Yes** | 購読する SQS キューの URL |
//! | `MAILER_BACKEND` | No | `sendgrid`（デフォルト）\| `smtp` \| `noop` |
//! | `SENDGRID_API_KEY` | backend=sendgrid | SendGrid API キー |
//! | `ADMIN_EMAIL` | No | 送信元アドレス（デフォルト: `adminemail@gmail.com`） |
//! | `REQUEUE_ON_FAILURE` | No | 失敗時にメッセージを再配信に委ねるか（デフォルト: `true`） |
//! | `LOG_FORMAT` | No | `json` \| `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（Mailpit 向け送信）
//! MAILER_BACKEND=smtp cargo run -p oshirase-dispatcher
//!
//! # 本番環境
//! LOG_FORMAT=json cargo run -p oshirase-dispatcher --release
//! ```

mod config;
mod error;
mod usecase;
mod worker;

use std::sync::Arc;

use anyhow::Context as _;
use config::{DispatcherConfig, MailerBackend};
use oshirase_domain::clock::SystemClock;
use oshirase_infra::{
    db,
    mailer::{Mailer, NoopMailer, SendGridMailer, SmtpMailer},
    queue::QueueConsumer,
    repository::{
        PostgresAttendeeRepository,
        PostgresDeliveryLogRepository,
        PostgresNotificationRepository,
    },
};
use oshirase_shared::observability::{TracingConfig, init_tracing};
use usecase::{DispatchUseCase, NoticeRenderer};
use worker::Worker;

/// ディスパッチャーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化（プロセス起動時に一度だけ）
    init_tracing(TracingConfig::from_env("dispatcher"));

    // 設定読み込み
    let config = DispatcherConfig::from_env();

    tracing::info!("Notification Dispatcher を起動します");

    // データベース接続プールを作成
    let pool = db::create_pool(&config.database.connection_url())
        .await
        .context("データベース接続に失敗しました")?;
    db::run_migrations(&pool)
        .await
        .context("マイグレーションの適用に失敗しました")?;
    tracing::info!("データベースに接続しました");

    // メール送信バックエンドを初期化
    let mailer: Arc<dyn Mailer> = match config.mailer.backend {
        MailerBackend::Sendgrid => {
            let api_key = config
                .mailer
                .sendgrid_api_key
                .clone()
                .context("SENDGRID_API_KEY が設定されていません")?;
            let mailer = match &config.mailer.sendgrid_api_base_url {
                Some(base_url) => SendGridMailer::with_base_url(
                    base_url,
                    api_key,
                    config.mailer.admin_email.clone(),
                ),
                None => SendGridMailer::new(api_key, config.mailer.admin_email.clone()),
            };
            Arc::new(mailer.context("SendGrid クライアントの初期化に失敗しました")?)
        }
        MailerBackend::Smtp => Arc::new(SmtpMailer::new(
            &config.mailer.smtp_host,
            config.mailer.smtp_port,
            config.mailer.admin_email.clone(),
        )),
        MailerBackend::Noop => Arc::new(NoopMailer),
    };
    tracing::info!(backend = %config.mailer.backend, "メール送信バックエンドを初期化しました");

    // SQS クライアントとコンシューマ
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let sqs_client = aws_sdk_sqs::Client::new(&aws_config);
    let consumer = QueueConsumer::new(
        sqs_client,
        config.queue.queue_url.clone(),
        config.queue.max_messages,
        config.queue.wait_time_seconds,
    );

    // 依存コンポーネントを初期化
    let notification_repo = PostgresNotificationRepository::new(pool.clone());
    let attendee_repo = PostgresAttendeeRepository::new(pool.clone());
    let delivery_log_repo = PostgresDeliveryLogRepository::new(pool.clone());
    let renderer = NoticeRenderer::new().context("メールテンプレートの初期化に失敗しました")?;
    let usecase = DispatchUseCase::new(
        notification_repo,
        attendee_repo,
        delivery_log_repo,
        mailer,
        renderer,
        Arc::new(SystemClock),
    );

    let worker = Worker::new(consumer, usecase, config.queue.requeue_on_failure);

    // ワーカー起動。Ctrl-C で停止
    tokio::select! {
        () = worker.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("停止シグナルを受信しました。ワーカーを終了します");
        }
    }

    Ok(())
}
