//! # メール送信
//!
//! 参加者向け通知メールの送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `Mailer` trait でメール送信を抽象化
//! - **3 つの実装**: SendGrid（本番用）、SMTP（Mailpit 開発用）、Noop（テスト用）
//! - **環境変数切替**: `MAILER_BACKEND` でランタイム選択

mod noop;
mod sendgrid;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopMailer;
use oshirase_domain::notification::{EmailMessage, MailError};
pub use sendgrid::SendGridMailer;
pub use smtp::SmtpMailer;

/// メール送信トレイト
///
/// 配信基盤の中核。メール送信の具体的な方法を抽象化する。
/// SendGrid / SMTP / Noop の 3 実装を環境変数で切り替える。
#[async_trait]
pub trait Mailer: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<(), MailError>;
}
