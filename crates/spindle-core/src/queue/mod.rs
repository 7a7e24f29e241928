//! Queue module: change notifications, the pending retry set, and retry policy.

mod notification;
mod pending;
mod retry;

pub use notification::{Delivery, NotificationReceiver, NotificationSender, notification_channel};
pub use pending::PendingSet;
pub use retry::RetryPolicy;
