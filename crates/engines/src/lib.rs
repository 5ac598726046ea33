//! Pure matching, scoring, and crowding logic.
//!
//! Nothing in this crate touches I/O; workers feed it rows from the store
//! and persist what comes back.

pub mod ladder;
pub mod pairing;
pub mod scoring;
