//! Query-string parameters shared by the routes.

use ontobrowse_models::ValueFormat;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub select: Option<String>,
    #[serde(rename = "show-headers")]
    pub show_headers: Option<String>,
    pub compact: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TreeQuery {
    pub format: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubjectQuery {
    pub curie: Option<String>,
    pub iri: Option<String>,
    pub format: Option<String>,
    pub select: Option<String>,
    #[serde(rename = "show-headers")]
    pub show_headers: Option<String>,
    pub compact: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub format: Option<String>,
    pub label: Option<String>,
    pub curie: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
    pub select: Option<String>,
    #[serde(rename = "show-headers")]
    pub show_headers: Option<String>,
    pub compact: Option<String>,
}

pub fn value_format(compact: &Option<String>) -> ValueFormat {
    ValueFormat::from_compact_flag(compact.as_deref())
}

/// Headers are shown unless explicitly turned off.
pub fn headers_hidden(show_headers: &Option<String>) -> bool {
    show_headers.as_deref() == Some("false")
}

/// Headers are shown when the flag is missing or `true`; any other value hides them.
pub fn headers_requested(show_headers: &Option<String>) -> bool {
    show_headers.as_deref().map_or(true, |v| v == "true")
}

/// `format=` value, or `default` when missing or blank.
pub fn format_name<'a>(format: &'a Option<String>, default: &'a str) -> &'a str {
    format
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(default)
}
