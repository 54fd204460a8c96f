//! In-memory book repository with write-through persistence.
//!
//! # Responsibility
//! - Own the ordered book collection and its ISBN uniqueness rule.
//! - Keep the JSON file in sync with memory after every mutation.
//!
//! # Invariants
//! - No two books share an ISBN.
//! - A mutation returns success only after the file was rewritten.
//! - A failed mutation leaves memory and file in their prior state.

pub mod library;
