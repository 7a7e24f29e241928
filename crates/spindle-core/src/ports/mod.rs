//! Ports - 抽象化レイヤー
//!
//! スケジューラが依存する外部システム（リレーショナル DB, 検索バックエンド）への
//! インターフェースを定義します。実装の詳細は `impls` に置きます。
//!
//! # 設計原則
//! - record store が source of truth（正本）
//! - search index は派生データ（冪等な upsert で at-least-once 配送）
//! - cursor は record store 側に永続化される

pub mod clock;
pub mod index_client;
pub mod record_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::index_client::IndexClient;
pub use self::record_store::RecordStore;
