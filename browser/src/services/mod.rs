pub mod constraints;
pub mod database;
pub mod export;
pub mod formatter;
pub mod prefixes;
pub mod templates;

pub use database::DatabaseLocator;
pub use export::{SqliteExporter, TermExporter};
pub use prefixes::PrefixResolver;
pub use templates::TemplateRenderer;
