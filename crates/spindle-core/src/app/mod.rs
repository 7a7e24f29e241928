//! App - アプリケーション層
//!
//! ports を組み合わせて同期スケジューラを実装します。
//!
//! # 主要コンポーネント
//! - **SchedulerBuilder**: 依存と設定のワイヤリング
//! - **Scheduler**: ライフサイクル（start / stop）と通知受付、バックグラウンドループ
//! - **Reconciler**: 1 回分のパス（pending の再試行 → cursor スキャン）
//! - **CursorScanner**: cursor 以降の追いつきスキャン
//! - **TaskIndexer**: 1 タスクの射影と索引付け

pub mod builder;
pub mod indexer;
pub mod reconcile;
pub mod scanner;
pub mod scheduler;

pub use self::builder::SchedulerBuilder;
pub use self::indexer::TaskIndexer;
pub use self::reconcile::Reconciler;
pub use self::scanner::CursorScanner;
pub use self::scheduler::Scheduler;
