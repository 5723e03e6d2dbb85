pub mod errors;
pub mod retry;
pub mod transport;
pub mod types;
