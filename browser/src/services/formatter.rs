//! Picks the exporter operation for an output format and wraps its output in a typed response.

use actix_web::HttpResponse;
use ontobrowse_models::{GraphFormat, OutputFormat, TableFormat, ValueFormat};
use sqlx::SqliteConnection;

use super::export::{ExportOptions, ExtractOptions, TermExporter};
use crate::errors::{BrowserError, BrowserResult};

pub const NOT_FOUND_MESSAGE: &str = "Term not found in database";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub no_headers: bool,
    pub value_format: ValueFormat,
    pub no_hierarchy: bool,
}

/// Runs the tabular export or the graph extraction; `None` when nothing was produced.
pub async fn render_terms(
    exporter: &dyn TermExporter,
    conn: &mut SqliteConnection,
    term_ids: &[String],
    predicates: Option<&[String]>,
    format: OutputFormat,
    options: &RenderOptions,
) -> BrowserResult<Option<String>> {
    let body = if let Ok(table) = TableFormat::try_from(format) {
        let export = ExportOptions {
            no_headers: options.no_headers,
            value_format: options.value_format,
        };
        exporter
            .export_terms(conn, term_ids, predicates, table, &export)
            .await?
    } else {
        let graph = GraphFormat::try_from(format).map_err(|other| {
            BrowserError::BadRequest(format!("Unsupported output format: {other}"))
        })?;
        let extract = ExtractOptions {
            no_hierarchy: options.no_hierarchy,
        };
        exporter
            .extract_terms(conn, term_ids, predicates, graph, &extract)
            .await?
    };

    Ok(Some(body).filter(|b| !b.is_empty()))
}

/// 200 with the format's content type, or the plain-text not-found message.
pub fn typed_response(body: Option<String>, format: OutputFormat) -> HttpResponse {
    match body {
        Some(body) => HttpResponse::Ok()
            .content_type(format.content_type())
            .body(body),
        None => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(NOT_FOUND_MESSAGE),
    }
}

/// Columns named by `select`, or the id column plus label, obsolete and replacement.
pub fn predicate_list(select: Option<&str>, value_format: ValueFormat) -> Vec<String> {
    match select.filter(|s| !s.trim().is_empty()) {
        Some(select) => select
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
        None => vec![
            value_format.as_str().to_string(),
            "label".to_string(),
            "obsolete".to_string(),
            "replacement".to_string(),
        ],
    }
}
