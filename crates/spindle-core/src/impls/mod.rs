//! Implementations of the ports.
//!
//! - **InMemoryRecordStore**: 開発・テスト用の record store
//! - **HttpIndexClient**: 検索バックエンドへの HTTP クライアント（本番用）
//! - **LoggingIndexClient**: ログを出すだけの dry-run クライアント

mod http_index;
mod inmem_store;
mod logging_index;

pub use http_index::{HttpIndexClient, SearchRequest, SearchResponse};
pub use inmem_store::InMemoryRecordStore;
pub use logging_index::LoggingIndexClient;
