//! Data Transfer Objects for REST request/response serialization.
//!
//! Identifiers and hashes are flattened to plain strings and UUIDs so the
//! wire format does not depend on the domain newtypes.

pub mod cycle_dto;
pub mod query_dto;
pub mod record_dto;

pub use cycle_dto::*;
pub use query_dto::*;
pub use record_dto::*;
