use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

pub const RDF_TYPE: &str = "rdf:type";
pub const RDFS_LABEL: &str = "rdfs:label";
pub const RDFS_SUBCLASS_OF: &str = "rdfs:subClassOf";
pub const OWL_CLASS: &str = "owl:Class";
pub const OWL_THING: &str = "owl:Thing";
pub const OWL_DEPRECATED: &str = "owl:deprecated";
pub const OBO_REPLACED_BY: &str = "obo:IAO_0100001";

/// Resource code of the pseudo-resource that spans every loaded ontology.
pub const ALL_RESOURCES: &str = "all";

/// `rdf:type` objects that mark a subject as a property.
pub const PROPERTY_KINDS: [&str; 3] = [
    "owl:ObjectProperty",
    "owl:DataProperty",
    "owl:AnnotationProperty",
];

/// A named ontology dataset with its own backing database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    pub code: String,
    pub name: String,
}

impl Resource {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// File stem of the backing database, e.g. `ONTIE` -> `ontie`.
    pub fn database_name(&self) -> String {
        self.code.to_lowercase()
    }

    pub fn is_aggregate(&self) -> bool {
        self.code == ALL_RESOURCES
    }
}

/// One row of the `statements` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Statement {
    pub subject: String,
    pub predicate: String,
    pub object: Option<String>,
    pub value: Option<String>,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl Statement {
    /// Object identifiers win over literal values when both are present.
    pub fn is_literal(&self) -> bool {
        self.object.is_none()
    }

    pub fn rendered_value(&self) -> &str {
        self.object
            .as_deref()
            .or(self.value.as_deref())
            .unwrap_or_default()
    }
}

/// One row of the `prefix` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct PrefixMapping {
    pub prefix: String,
    pub base: String,
}

/// The two listable entity kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Subject,
    Predicate,
}

impl EntityKind {
    /// Column of `statements` that holds identifiers of this kind.
    pub fn column(&self) -> &'static str {
        match self {
            EntityKind::Subject => "subject",
            EntityKind::Predicate => "predicate",
        }
    }

    /// Path segment used by the listing routes.
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Subject => "subjects",
            EntityKind::Predicate => "predicates",
        }
    }

    pub fn from_plural(segment: &str) -> Option<Self> {
        match segment {
            "subjects" => Some(EntityKind::Subject),
            "predicates" => Some(EntityKind::Predicate),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// How term identifiers are rendered in exported values.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValueFormat {
    #[default]
    #[serde(rename = "IRI")]
    Iri,
    #[serde(rename = "CURIE")]
    Curie,
}

impl ValueFormat {
    /// `compact=true` selects CURIEs, anything else IRIs.
    pub fn from_compact_flag(compact: Option<&str>) -> Self {
        match compact {
            Some("true") => ValueFormat::Curie,
            _ => ValueFormat::Iri,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueFormat::Iri => "IRI",
            ValueFormat::Curie => "CURIE",
        }
    }
}

impl FromStr for ValueFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IRI" => Ok(ValueFormat::Iri),
            "CURIE" => Ok(ValueFormat::Curie),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ValueFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
