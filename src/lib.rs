//! Bookshelf application library
//!
//! Domain modules (books, users), the favorite-suggestion query engine and
//! the bootstrap shared by the server binary and the CLI.

pub mod app;
pub mod error;
pub mod modules;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{StoreError, StoreResult};
pub use modules::books::suggestions::SuggestionEngine;
