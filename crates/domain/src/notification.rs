//! # 通知
//!
//! 通知ディスパッチに関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 役割 |
//! |---|------------|------|
//! | [`NotificationId`] | 通知 ID | キューメッセージ本文で受け渡される整数キー |
//! | [`NotificationContent`] | 通知本文 | `notification` テーブルの message / subject |
//! | [`DeliveryStatus`] | 配信結果種別 | 参加者 1 名分の送信結果（sent / failed） |
//! | [`EmailMessage`] | メールメッセージ | レンダリング済みの送信単位 |
//!
//! ## 設計方針
//!
//! - **整数キーの通知 ID**: 通知レコードは外部システムが採番する。
//!   UUID ではなくトリガーペイロードの整数をそのまま使う
//! - **配信結果の記録**: 参加者ごとの成否を `notification_deliveries` に
//!   fire-and-forget で記録する

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

/// 通知 ID（整数キー）
///
/// キューメッセージ本文の UTF-8 文字列をパースして得られる。
/// `notification` テーブルの主キーと対応する。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("{_0}")]
pub struct NotificationId(i64);

impl NotificationId {
    /// 既存の整数値から通知 ID を作成する
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// キューメッセージ本文から通知 ID をパースする
    ///
    /// 前後の空白は許容する。10 進整数として解釈できない本文は
    /// [`DomainError::Validation`](crate::DomainError::Validation) になる。
    /// パース失敗は DB・メール送信のどの I/O よりも先に検出される。
    pub fn parse(body: &str) -> Result<Self, crate::DomainError> {
        body.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| {
                crate::DomainError::Validation(format!(
                    "キューメッセージ本文が通知 ID としてパースできません: {body:?}"
                ))
            })
    }

    /// 内部の整数値を取得する
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 通知本文
///
/// `notification` テーブルから取得する message / subject の組。
/// 完了記録（completed_date / status）はリポジトリの更新操作が担い、
/// この型は送信に必要な読み取り専用データのみを持つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    /// 通知メッセージ（メール本文に埋め込まれる）
    pub message: String,
    /// メール件名
    pub subject: String,
}

/// 完了ステータス文字列を生成する
///
/// `notification.status` カラムに記録される値。
/// 通知に**成功**した参加者数を埋め込む（ロスター全件数ではない）。
pub fn completion_status(notified_count: usize) -> String {
    format!("Notified {notified_count} attendees")
}

define_uuid_id! {
    /// 配信ログ ID（一意識別子）
    ///
    /// notification_deliveries テーブルの主キー。UUID v7 を使用。
    pub struct NotificationDeliveryId;
}

/// メール送信エラー
#[derive(Debug, Error)]
pub enum MailError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// 配信結果種別
///
/// notification_deliveries テーブルの `status` カラムに格納される値。
/// snake_case でシリアライズされる。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryStatus {
    /// 送信成功
    Sent,
    /// 送信失敗（送信 API のエラー、またはレンダリング失敗）
    Failed,
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。Mailer に渡される送信単位。
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:        String,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// プレーンテキスト本文
    pub text_body: String,
}
