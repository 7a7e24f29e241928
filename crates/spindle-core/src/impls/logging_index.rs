use async_trait::async_trait;
use tracing::info;

use crate::domain::IndexDocument;
use crate::error::IndexError;
use crate::ports::IndexClient;

/// Dry-run index client: logs each document and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingIndexClient;

#[async_trait]
impl IndexClient for LoggingIndexClient {
    async fn index_task(&self, document: &IndexDocument) -> Result<(), IndexError> {
        info!(
            task_id = %document.task_id,
            task_name = %document.task_name,
            task_type = document.task_type.as_deref().unwrap_or(""),
            geo_data = document.geo_data.as_deref().unwrap_or(""),
            "would index task"
        );
        Ok(())
    }
}
