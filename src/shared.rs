pub mod emit;
pub mod errors;
pub mod events;
pub mod settings;
pub mod store;
pub mod types;

// Re-export CommandError for convenience
pub use errors::{CommandError, CommandResult};
