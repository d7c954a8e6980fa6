//! Domain types shared by the ontology browser crates.

pub mod constraint;
pub mod format;
pub mod ontology;
pub mod pagination;

pub use constraint::*;
pub use format::*;
pub use ontology::*;
pub use pagination::*;
