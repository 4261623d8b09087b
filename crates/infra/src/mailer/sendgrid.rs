//! SendGrid 通知送信実装
//!
//! SendGrid の Mail Send API (`POST /v3/mail/send`) を使用してメールを送信する。
//! 本番環境で使用する。

use std::time::Duration;

use async_trait::async_trait;
use oshirase_domain::notification::{EmailMessage, MailError};
use serde::Serialize;

use super::Mailer;

/// SendGrid API のデフォルトベース URL
///
/// 開発環境でスタブサーバーに向ける場合は [`SendGridMailer::with_base_url`] で
/// 上書きする。
pub const DEFAULT_API_BASE_URL: &str = "https://api.sendgrid.com";

/// 送信 API のリクエストタイムアウト
///
/// ワーカーが外部 API 待ちで無期限にブロックしないよう保守的に設定する。
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// SendGrid 通知送信
///
/// `reqwest::Client` をラップし、Bearer 認証で Mail Send API を呼び出す。
pub struct SendGridMailer {
    client:       reqwest::Client,
    api_base_url: String,
    api_key:      String,
    from_address: String,
}

impl SendGridMailer {
    /// 新しい SendGrid 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `api_key`: SendGrid API キー
    /// - `from_address`: 送信元メールアドレス
    pub fn new(api_key: String, from_address: String) -> Result<Self, MailError> {
        Self::with_base_url(DEFAULT_API_BASE_URL, api_key, from_address)
    }

    /// ベース URL を指定して SendGrid 送信インスタンスを作成
    ///
    /// スタブサーバーに向けるテスト・開発環境向け。
    pub fn with_base_url(
        base_url: &str,
        api_key: String,
        from_address: String,
    ) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MailError::SendFailed(format!("HTTP クライアント構築失敗: {e}")))?;

        Ok(Self {
            client,
            api_base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            from_address,
        })
    }

    /// Mail Send API のリクエストボディを構築する
    fn build_payload(&self, email: &EmailMessage) -> MailSendRequest {
        MailSendRequest {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: email.to.clone(),
                }],
            }],
            from: EmailAddress {
                email: self.from_address.clone(),
            },
            subject: email.subject.clone(),
            // SendGrid は text/plain を text/html より先に並べることを要求する
            content: vec![
                Content {
                    content_type: "text/plain".to_string(),
                    value:        email.text_body.clone(),
                },
                Content {
                    content_type: "text/html".to_string(),
                    value:        email.html_body.clone(),
                },
            ],
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), MailError> {
        let url = format!("{}/v3/mail/send", self.api_base_url);
        let payload = self.build_payload(email);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MailError::SendFailed(format!("SendGrid への接続に失敗: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::SendFailed(format!(
                "SendGrid 送信失敗: HTTP {status}: {body}"
            )));
        }

        Ok(())
    }
}

// ===== Mail Send API リクエスト型 =====

#[derive(Debug, Serialize)]
struct MailSendRequest {
    personalizations: Vec<Personalization>,
    from:             EmailAddress,
    subject:          String,
    content:          Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    value:        String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn make_mailer() -> SendGridMailer {
        SendGridMailer::new("SG.test-key".to_string(), "admin@example.com".to_string()).unwrap()
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SendGridMailer>();
    }

    #[test]
    fn build_payloadがmail_send_apiの形式に一致する() {
        let mailer = make_mailer();
        let email = EmailMessage {
            to:        "a@x.com".to_string(),
            subject:   "Welcome".to_string(),
            html_body: "Dear Ann,<br><br><strong>Event starts soon</strong>".to_string(),
            text_body: "Dear Ann,\n\nEvent starts soon".to_string(),
        };

        let payload = serde_json::to_value(mailer.build_payload(&email)).unwrap();

        assert_eq!(
            payload,
            json!({
                "personalizations": [{ "to": [{ "email": "a@x.com" }] }],
                "from": { "email": "admin@example.com" },
                "subject": "Welcome",
                "content": [
                    { "type": "text/plain", "value": "Dear Ann,\n\nEvent starts soon" },
                    { "type": "text/html", "value": "Dear Ann,<br><br><strong>Event starts soon</strong>" }
                ]
            })
        );
    }

    #[test]
    fn with_base_urlが末尾スラッシュを除去する() {
        let mailer = SendGridMailer::with_base_url(
            "http://localhost:4010/",
            "SG.test-key".to_string(),
            "admin@example.com".to_string(),
        )
        .unwrap();

        assert_eq!(mailer.api_base_url, "http://localhost:4010");
    }
}
