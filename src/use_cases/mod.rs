//! Use cases
//!
//! One struct per application operation. Each wraps a repository trait object and
//! forwards to exactly one repository call; the only logic here is turning an absent
//! row into `ApiError::NotFound` where the operation requires the row to exist.
//! Handlers depend on these rather than on a concrete backend.

pub mod posts;
pub mod roles;
pub mod users;
