//! SchedulerBuilder - スケジューラの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 依存（store / client）が欠けていてもビルドは失敗しない
//!   → `Scheduler::start` が警告を出して何もしない（無効化）

use std::sync::Arc;
use std::time::Duration;

use super::scheduler::Scheduler;
use crate::config::{DEFAULT_INDEX_TIMEOUT, SchedulerConfig, SearchConfig};
use crate::ports::{IndexClient, RecordStore};

/// SchedulerBuilder は Scheduler を構築
///
/// # 使用例
/// ```ignore
/// let scheduler = SchedulerBuilder::new()
///     .config(cfg.scheduler.clone())
///     .store(store)
///     .client(client)
///     .build();
/// scheduler.start(&root_token);
/// ```
pub struct SchedulerBuilder {
    config: SchedulerConfig,
    index_timeout: Duration,
    store: Option<Arc<dyn RecordStore>>,
    client: Option<Arc<dyn IndexClient>>,
}

impl SchedulerBuilder {
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
            index_timeout: DEFAULT_INDEX_TIMEOUT,
            store: None,
            client: None,
        }
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Take the per-call index timeout from the search backend settings.
    pub fn search(mut self, search: &SearchConfig) -> Self {
        self.index_timeout = search.index_timeout();
        self
    }

    pub fn index_timeout(mut self, timeout: Duration) -> Self {
        self.index_timeout = timeout;
        self
    }

    pub fn store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn client(mut self, client: Arc<dyn IndexClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Optional wiring, for hosts where search may be switched off.
    pub fn maybe_client(mut self, client: Option<Arc<dyn IndexClient>>) -> Self {
        self.client = client;
        self
    }

    pub fn build(self) -> Scheduler {
        Scheduler::new(self.config, self.index_timeout, self.store, self.client)
    }
}

impl Default for SchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
