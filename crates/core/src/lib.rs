//! Core business logic for quill.
//!
//! Services validate input, keep the category and comment trees consistent,
//! derive unique slugs, arbitrate votes and order multi-step deletions. All
//! persistence goes through the `quill-db` repositories.

pub mod services;

pub use services::*;
