use serde::{Deserialize, Serialize};
use std::fmt;

/// Every representation the browser can answer with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Html,
    Json,
    Tsv,
    Csv,
    #[serde(rename = "ttl")]
    Turtle,
}

impl OutputFormat {
    /// Parses the short name used in URLs and `format=` parameters.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "html" => Some(OutputFormat::Html),
            "json" => Some(OutputFormat::Json),
            "tsv" => Some(OutputFormat::Tsv),
            "csv" => Some(OutputFormat::Csv),
            "ttl" => Some(OutputFormat::Turtle),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Json => "json",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Csv => "csv",
            OutputFormat::Turtle => "ttl",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Json => "application/json",
            OutputFormat::Tsv => "text/tab-separated-values",
            OutputFormat::Csv => "text/comma-separated-values",
            OutputFormat::Turtle => "text/turtle",
        }
    }

    /// Whether the tabular exporter or the graph extractor produces it.
    pub fn is_tabular(&self) -> bool {
        matches!(self, OutputFormat::Html | OutputFormat::Tsv | OutputFormat::Csv)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output kinds of the tabular exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Html,
    Tsv,
    Csv,
}

impl TableFormat {
    pub fn delimiter(&self) -> Option<char> {
        match self {
            TableFormat::Html => None,
            TableFormat::Tsv => Some('\t'),
            TableFormat::Csv => Some(','),
        }
    }
}

/// Output kinds of the graph extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    JsonLd,
    Turtle,
}

impl TryFrom<OutputFormat> for TableFormat {
    type Error = OutputFormat;

    fn try_from(format: OutputFormat) -> Result<Self, Self::Error> {
        match format {
            OutputFormat::Html => Ok(TableFormat::Html),
            OutputFormat::Tsv => Ok(TableFormat::Tsv),
            OutputFormat::Csv => Ok(TableFormat::Csv),
            other => Err(other),
        }
    }
}

impl TryFrom<OutputFormat> for GraphFormat {
    type Error = OutputFormat;

    fn try_from(format: OutputFormat) -> Result<Self, Self::Error> {
        match format {
            OutputFormat::Json => Ok(GraphFormat::JsonLd),
            OutputFormat::Turtle => Ok(GraphFormat::Turtle),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_content_types() {
        assert_eq!(OutputFormat::from_name("ttl"), Some(OutputFormat::Turtle));
        assert_eq!(OutputFormat::from_name("xml"), None);
        assert_eq!(OutputFormat::Csv.content_type(), "text/comma-separated-values");
        assert_eq!(OutputFormat::Turtle.to_string(), "ttl");
    }

    #[test]
    fn test_collaborator_split() {
        assert!(OutputFormat::Tsv.is_tabular());
        assert!(!OutputFormat::Json.is_tabular());
        assert_eq!(TableFormat::try_from(OutputFormat::Csv), Ok(TableFormat::Csv));
        assert_eq!(GraphFormat::try_from(OutputFormat::Json), Ok(GraphFormat::JsonLd));
        assert_eq!(GraphFormat::try_from(OutputFormat::Html), Err(OutputFormat::Html));
    }
}
