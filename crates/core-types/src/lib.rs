pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use error::ValidationError;
pub use structs::{parse_balance, Client, ClientInput};
