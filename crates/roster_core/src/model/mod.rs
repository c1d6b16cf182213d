//! Domain model for personnel records.
//!
//! # Responsibility
//! - Define the canonical `Personal` record and its closed set of variants.
//! - Keep format/storage concerns out of the domain types.
//!
//! # Invariants
//! - Every persisted record carries a unique integer id; `0` means unassigned.
//! - Variant dispatch goes through `PersonalTag`, never string comparison.

pub mod personal;
