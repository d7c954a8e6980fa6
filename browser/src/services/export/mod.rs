//! Seam to the term export/extraction library.
//!
//! Routes only pick the operation and map options; everything about how
//! terms are laid out lives behind [`TermExporter`]. [`SqliteExporter`] is
//! the implementation wired in by default.

mod graph;
mod sqlite;
mod table;
mod tree;

pub use sqlite::SqliteExporter;

use async_trait::async_trait;
use ontobrowse_models::{
    GraphFormat, TableFormat, ValueFormat, OBO_REPLACED_BY, OWL_DEPRECATED, RDFS_LABEL,
};
use sqlx::SqliteConnection;

use crate::errors::BrowserResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub no_headers: bool,
    /// How the id column and object values are rendered
    pub value_format: ValueFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Leave out the ancestors of the requested terms
    pub no_hierarchy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    pub title: String,
    /// Link pattern; `{curie}` is replaced by each term id
    pub href: String,
    pub include_search: bool,
}

#[async_trait]
pub trait TermExporter: Send + Sync {
    /// Tabular export. Returns an empty string when none of the terms exist.
    async fn export_terms(
        &self,
        conn: &mut SqliteConnection,
        term_ids: &[String],
        predicates: Option<&[String]>,
        format: TableFormat,
        options: &ExportOptions,
    ) -> BrowserResult<String>;

    /// Graph extraction. Returns an empty string when none of the terms exist.
    async fn extract_terms(
        &self,
        conn: &mut SqliteConnection,
        term_ids: &[String],
        predicates: Option<&[String]>,
        format: GraphFormat,
        options: &ExtractOptions,
    ) -> BrowserResult<String>;

    /// Label search, serialized as a JSON array.
    async fn search(
        &self,
        conn: &mut SqliteConnection,
        text: &str,
        limit: usize,
    ) -> BrowserResult<String>;

    /// HTML fragment of the class hierarchy around `term_id` (or the top level).
    async fn tree(
        &self,
        conn: &mut SqliteConnection,
        term_id: Option<&str>,
        options: &TreeOptions,
    ) -> BrowserResult<String>;
}

/// A requested column of a tabular export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Column {
    /// The term's own identifier
    Id { header: String, format: ValueFormat },
    Predicate { header: String, predicate: String },
}

impl Column {
    pub(crate) fn from_name(name: &str) -> Self {
        match name {
            "IRI" => Column::Id { header: name.to_string(), format: ValueFormat::Iri },
            "CURIE" => Column::Id { header: name.to_string(), format: ValueFormat::Curie },
            other => Column::Predicate {
                header: other.to_string(),
                predicate: predicate_for(other).to_string(),
            },
        }
    }

    pub(crate) fn header(&self) -> &str {
        match self {
            Column::Id { header, .. } | Column::Predicate { header, .. } => header,
        }
    }
}

/// Maps the short column names accepted in `select` to predicate CURIEs.
pub(crate) fn predicate_for(name: &str) -> &str {
    match name {
        "label" => RDFS_LABEL,
        "obsolete" => OWL_DEPRECATED,
        "replacement" => OBO_REPLACED_BY,
        other => other,
    }
}
