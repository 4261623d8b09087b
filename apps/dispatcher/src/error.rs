//! # Dispatcher エラー定義
//!
//! ディスパッチ処理で発生するエラーと、キューメッセージの後処理方針への
//! 変換を定義する。
//!
//! ## 設計方針
//!
//! エラー種別は運用上の観点で区別可能なまま保持する:
//! 不正ペイロード / 通知未存在 / データアクセス。まとめて 1 つの
//! ログ行に潰すと、どの障害かを切り分けられなくなる。

use oshirase_domain::notification::NotificationId;
use oshirase_infra::InfraError;
use thiserror::Error;

/// キューメッセージの後処理方針
///
/// ワーカーはディスパッチ結果からこの方針を導き、メッセージを
/// 削除（ACK）するか再配信に委ねるかを決める。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDisposition {
    /// メッセージを削除する。再配信しても結果が変わらない場合
    Discard,
    /// メッセージを削除しない。可視性タイムアウト後に再配信され、
    /// キューのデッドレター設定が再試行回数を抑える
    Retry,
}

/// ディスパッチ処理で発生するエラー
#[derive(Debug, Error)]
pub enum DispatchError {
    /// キューメッセージ本文が通知 ID としてパースできない
    ///
    /// どの I/O よりも先に検出される。ポイズンメッセージとして扱う。
    #[error("不正なメッセージ本文: {0}")]
    MalformedPayload(String),

    /// 通知レコードが存在しない
    ///
    /// 行アクセスの失敗ではなく、明示的な NotFound として表面化させる。
    #[error("通知が見つかりません: id={id}")]
    NotificationNotFound {
        /// 検索に使用した通知 ID
        id: NotificationId,
    },

    /// データアクセスエラー（接続失敗、クエリ失敗、完了記録の失敗）
    #[error("データアクセスエラー: {0}")]
    DataAccess(#[from] InfraError),
}

impl DispatchError {
    /// エラー種別からメッセージの後処理方針を導く
    pub fn disposition(&self) -> MessageDisposition {
        match self {
            // パース不能な本文は再配信しても直らない
            Self::MalformedPayload(_) => MessageDisposition::Discard,
            // 通知行がまだ可視になっていないだけの可能性がある。
            // 恒久的な欠落はキューのデッドレター設定で打ち止めになる
            Self::NotificationNotFound { .. } => MessageDisposition::Retry,
            Self::DataAccess(_) => MessageDisposition::Retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_不正ペイロードは破棄される() {
        let err = DispatchError::MalformedPayload("abc".to_string());
        assert_eq!(err.disposition(), MessageDisposition::Discard);
    }

    #[test]
    fn test_通知未存在は再配信に委ねられる() {
        let err = DispatchError::NotificationNotFound {
            id: NotificationId::new(42),
        };
        assert_eq!(err.disposition(), MessageDisposition::Retry);
    }

    #[test]
    fn test_データアクセスエラーは再配信に委ねられる() {
        let err = DispatchError::DataAccess(InfraError::unexpected("接続失敗"));
        assert_eq!(err.disposition(), MessageDisposition::Retry);
    }
}
