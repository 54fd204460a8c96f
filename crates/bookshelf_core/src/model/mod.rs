//! Domain model for the book collection.
//!
//! # Responsibility
//! - Define the canonical `Book` value shared by storage, library and
//!   request handlers.
//! - Own the plain record shape used for the JSON file and lookup results.
//!
//! # Invariants
//! - A `Book` is immutable once constructed; updates replace the whole value.
//! - Every `Book` has non-blank `title`, `author` and `isbn`.

pub mod book;
