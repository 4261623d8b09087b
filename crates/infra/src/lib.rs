//! # Oshirase インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! このクレートはドメイン層の型に対する永続化・送信の具体実装を提供する。
//! 外部システムの詳細をカプセル化し、ユースケース層をインフラの変更から
//! 保護する。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理
//! - **リポジトリ実装**: notification / attendee / 配信ログの読み書き
//! - **メール送信**: SendGrid / SMTP / Noop の 3 バックエンド
//! - **キュー購読**: SQS からのメッセージ受信・削除
//!
//! ## 依存関係
//!
//! ```text
//! dispatcher → infra → domain → shared
//! ```
//!
//! インフラ層は `domain` に依存する。
//! ドメイン層はインフラ層に依存しない（依存性逆転の原則）。
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリ実装
//! - [`mailer`] - メール送信バックエンド
//! - [`queue`] - SQS キューコンシューマ

pub mod db;
pub mod error;
pub mod mailer;
pub mod queue;
pub mod repository;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::InfraError;
