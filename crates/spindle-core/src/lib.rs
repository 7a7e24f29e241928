//! spindle-core
//!
//! Keeps the external search index eventually consistent with the task store.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（TaskId, Task, SyncCursor, IndexDocument, Decision）
//! - **ports**: 抽象化レイヤー（RecordStore, IndexClient, Clock）
//! - **queue**: 通知キューと pending retry set（retry policy を含む）
//! - **app**: スケジューラ本体（builder, scheduler loop, reconcile pass, cursor scanner）
//! - **impls**: 実装（InMemoryRecordStore, HttpIndexClient, LoggingIndexClient）
//! - **config** / **observability** / **error**: 設定・ログ・エラー型

pub mod domain;
pub mod ports;
pub mod queue;
pub mod app;
pub mod impls;
pub mod config;
pub mod error;
pub mod observability;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{Scheduler, SchedulerBuilder};
pub use config::{Config, SchedulerConfig, SearchConfig};
pub use error::{ConfigError, IndexError, LoggerError, StoreError};
