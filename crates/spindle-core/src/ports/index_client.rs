//! IndexClient port - 検索バックエンドへの書き込み

use async_trait::async_trait;

use crate::domain::IndexDocument;
use crate::error::IndexError;

/// Accepts one task's searchable fields.
///
/// Implementations are expected to bound their own request time. Upserts must
/// be idempotent on the receiving side: the scheduler may send the same
/// document more than once.
#[async_trait]
pub trait IndexClient: Send + Sync {
    async fn index_task(&self, document: &IndexDocument) -> Result<(), IndexError>;
}
