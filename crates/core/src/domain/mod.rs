// Domain Layer - Pure business logic and entities

pub mod barber;
pub mod error;
pub mod queue_entry;
pub mod shop;

// Re-exports
pub use barber::{Barber, BarberId, DEFAULT_AVERAGE_CUT_TIME_MINUTES};
pub use error::DomainError;
pub use queue_entry::{EntryId, EntryStatus, QueueEntry};
pub use shop::{ShopConfig, ShopId};
