//! # Oshirase ドメイン層
//!
//! 通知ディスパッチのビジネスロジックを担うドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ・値オブジェクト**: 通知 ID、通知本文、参加者などの
//!   中核データ型を提供する
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//! - **インフラ非依存**: DB や外部サービスの詳細には一切依存しない
//!
//! ## 依存関係の方向
//!
//! ```text
//! dispatcher → infra → domain → shared
//! ```
//!
//! ## モジュール構成
//!
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`notification`] - 通知本文・配信結果のドメインモデル
//! - [`attendee`] - 参加者レコード
//! - [`clock`] - テスト注入可能な時刻プロバイダ

#[macro_use]
mod macros;

pub mod attendee;
pub mod clock;
pub mod error;
pub mod notification;

pub use error::DomainError;
