//! Shared domain types for the Planboard client.
//!
//! Everything here is plain data: the REST payloads exchanged with the
//! backend and the client-side board transition-rules editor. Nothing in
//! this crate performs I/O.

pub mod models;
pub mod transitions;

pub use models::*;
pub use transitions::{Transition, TransitionError, TransitionRules};
