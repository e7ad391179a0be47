//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod lifecycle;
pub mod terminal;

pub use lifecycle::{LifecycleError, LifecycleRepository, SettlementOutcome};
pub use terminal::{RegistryError, TerminalRepository};
