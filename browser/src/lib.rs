//! Web front end for browsing ontology terms kept in per-resource SQLite databases.

pub mod errors;
pub mod handlers;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;

pub use errors::{BrowserError, BrowserResult};
pub use handlers::{configure_app, configure_routes};
pub use state::AppState;
