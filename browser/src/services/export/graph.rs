use ontobrowse_models::Statement;
use serde_json::{json, Map, Value};

use super::sqlite::TermData;
use crate::errors::{BrowserError, BrowserResult};
use crate::services::prefixes::PrefixResolver;

const XSD_STRING: &str = "xsd:string";

/// `{"@context": {prefix: base}, "@graph": [node, ...]}` with CURIE keys.
pub(crate) fn json_ld(terms: &[TermData], resolver: &PrefixResolver) -> BrowserResult<String> {
    let context: Map<String, Value> = resolver
        .prefixes()
        .into_iter()
        .map(|m| (m.prefix.clone(), Value::String(m.base.clone())))
        .collect();

    let graph: Vec<Value> = terms.iter().map(node).collect();

    serde_json::to_string_pretty(&json!({ "@context": context, "@graph": graph }))
        .map_err(|e| BrowserError::Internal(e.to_string()))
}

fn node(term: &TermData) -> Value {
    let mut node = Map::new();
    node.insert("@id".to_string(), Value::String(term.id.clone()));
    for statement in &term.statements {
        let values = node
            .entry(statement.predicate.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(values) = values {
            values.push(json_value(statement));
        }
    }
    Value::Object(node)
}

fn json_value(statement: &Statement) -> Value {
    if let Some(object) = &statement.object {
        return json!({ "@id": object });
    }
    let mut literal = Map::new();
    literal.insert(
        "@value".to_string(),
        Value::String(statement.value.clone().unwrap_or_default()),
    );
    if let Some(language) = &statement.language {
        literal.insert("@language".to_string(), Value::String(language.clone()));
    } else if let Some(datatype) = statement.datatype.as_deref().filter(|d| *d != XSD_STRING) {
        literal.insert("@type".to_string(), Value::String(datatype.to_string()));
    }
    Value::Object(literal)
}

pub(crate) fn turtle(terms: &[TermData], resolver: &PrefixResolver) -> String {
    let mut out = String::new();
    for mapping in resolver.prefixes() {
        out.push_str(&format!("@prefix {}: <{}> .\n", mapping.prefix, mapping.base));
    }

    for term in terms.iter().filter(|t| !t.statements.is_empty()) {
        out.push('\n');
        out.push_str(&resource_ref(&term.id, resolver));
        let last = term.statements.len() - 1;
        for (i, statement) in term.statements.iter().enumerate() {
            out.push_str(&format!(
                "\n  {} {} {}",
                resource_ref(&statement.predicate, resolver),
                turtle_object(statement, resolver),
                if i == last { "." } else { ";" }
            ));
        }
        out.push('\n');
    }
    out
}

fn turtle_object(statement: &Statement, resolver: &PrefixResolver) -> String {
    if let Some(object) = &statement.object {
        return resource_ref(object, resolver);
    }
    let mut literal = format!(
        "\"{}\"",
        escape_literal(statement.value.as_deref().unwrap_or_default())
    );
    if let Some(language) = &statement.language {
        literal.push('@');
        literal.push_str(language);
    } else if let Some(datatype) = statement.datatype.as_deref().filter(|d| *d != XSD_STRING) {
        literal.push_str("^^");
        literal.push_str(&resource_ref(datatype, resolver));
    }
    literal
}

/// CURIEs with a declared prefix and blank nodes stay as they are; anything else is written as an IRI.
fn resource_ref(id: &str, resolver: &PrefixResolver) -> String {
    if id.starts_with("_:") || resolver.to_iri(id).is_some() {
        id.to_string()
    } else {
        format!("<{id}>")
    }
}

fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}
