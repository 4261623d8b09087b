//! # 通知メールレンダラー
//!
//! tera テンプレートエンジンで参加者宛メールを HTML / plaintext 両形式で
//! 生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **件名は通知の subject をそのまま使用**: プレフィックスや装飾は付けない
//! - **本文**: 参加者の名前で宛名を入れ、通知メッセージを強調表示する

use oshirase_domain::{
    attendee::Attendee,
    notification::{EmailMessage, MailError, NotificationContent},
};
use tera::{Context, Tera};

/// 通知メールレンダラー
///
/// tera テンプレートエンジンをラップし、通知本文と参加者から
/// `EmailMessage` を生成する。
pub struct NoticeRenderer {
    engine: Tera,
}

impl NoticeRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new() -> Result<Self, MailError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "attendee_notice.html",
                    include_str!("../../templates/notifications/attendee_notice.html"),
                ),
                (
                    "attendee_notice.txt",
                    include_str!("../../templates/notifications/attendee_notice.txt"),
                ),
            ])
            .map_err(|e| MailError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 通知本文と参加者からメールメッセージを生成する
    pub fn render(
        &self,
        content: &NotificationContent,
        attendee: &Attendee,
    ) -> Result<EmailMessage, MailError> {
        let mut context = Context::new();
        context.insert("first_name", &attendee.first_name);
        context.insert("message", &content.message);

        let html_body = self
            .engine
            .render("attendee_notice.html", &context)
            .map_err(|e| MailError::TemplateFailed(e.to_string()))?;

        let text_body = self
            .engine
            .render("attendee_notice.txt", &context)
            .map_err(|e| MailError::TemplateFailed(e.to_string()))?;

        Ok(EmailMessage {
            to: attendee.email.clone(),
            subject: content.subject.clone(),
            html_body,
            text_body,
        })
    }
}
