// Application Layer - Use Cases and Business Logic

pub mod dispatcher;
pub mod eligibility;
pub mod run_loop;
pub mod scanner;

// Re-exports
pub use dispatcher::{DispatchOutcome, NotificationDispatcher};
pub use eligibility::{assess, should_notify, Assessment, ShopSnapshot};
pub use run_loop::{shutdown_channel, RunLoop, ShutdownSender, ShutdownToken};
pub use scanner::{EntryOutcome, QueueScanner, RunReport, SkipReason};
