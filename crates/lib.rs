pub mod domain;
pub mod inference;
pub mod infra;
pub mod observability;
pub mod payments;
