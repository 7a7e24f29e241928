//! Domain model (ids, tasks, cursor, index documents, retry decisions).

pub mod cursor;
pub mod decision;
pub mod document;
pub mod ids;
pub mod task;

pub use cursor::SyncCursor;
pub use decision::Decision;
pub use document::{IndexDocument, MetaFields};
pub use ids::TaskId;
pub use task::{Task, VerificationType};
