//! # 参加者
//!
//! メール通知の宛先となる参加者レコード。読み取り専用。

use serde::{Deserialize, Serialize};

/// 参加者
///
/// `attendee` テーブルの 1 行。このシステムは参加者を作成・更新しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// メールアドレス（送信先）
    pub email:      String,
    /// 名前（メール本文の宛名に使用）
    pub first_name: String,
}
