//! Application services shared by the HTTP and console front ends.
//!
//! # Responsibility
//! - Serialize library mutations behind one lock.
//! - Run external lookups before taking that lock.

pub mod library_service;
