//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## 設計方針
//!
//! - **型による分類**: エラーの種類を列挙型で明示し、パターンマッチで処理可能に
//! - **thiserror 活用**: `#[error(...)]` マクロでエラーメッセージを自動生成
//!
//! ## 使用例
//!
//! ```rust
//! use oshirase_domain::DomainError;
//!
//! fn find_notification(id: i64) -> Result<(), DomainError> {
//!     // データベースから検索...
//!     Err(DomainError::NotFound {
//!         entity_type: "Notification",
//!         id:          id.to_string(),
//!     })
//! }
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
///
/// ビジネスロジックの実行中に発生する例外状態を表現する。
/// ディスパッチャーはこのエラーを受け取り、キューメッセージの
/// 処理方針（破棄 / 再配信）に変換する。
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値が要求を満たさない場合に使用する。
    /// 典型的にはキューメッセージ本文が整数としてパースできない場合。
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// エンティティが見つからない
    ///
    /// 指定された ID のエンティティがデータベースに存在しない場合に使用する。
    /// `entity_type` にはエンティティの種類（"Notification" など）を指定し、
    /// エラーメッセージを具体的にする。
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（コンパイル時に決定される `&'static str`）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },
}
