//! # ユースケース層
//!
//! ディスパッチャーのビジネスロジックを実装する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: リポジトリはジェネリクス、メーラーと時計は
//!   `Arc<dyn Trait>` で外部から注入
//! - **薄いワーカー**: キュー操作はワーカーに、通知処理はユースケースに集約

pub mod dispatch;
pub mod notice_renderer;

pub use dispatch::{DispatchOutcome, DispatchUseCase};
pub use notice_renderer::NoticeRenderer;
