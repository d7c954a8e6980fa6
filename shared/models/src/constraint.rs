//! Query-string constraints of the form `<type>.<expression>`.
//!
//! `like.ONTIE:0*` matches with the store's `LIKE` (`*` becomes `%`),
//! `eq.Disease` matches exactly and `in.(a,b,c)` matches any listed value.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which query parameter a constraint came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintField {
    Label,
    Curie,
}

impl fmt::Display for ConstraintField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintField::Label => f.write_str("label"),
            ConstraintField::Curie => f.write_str("curie"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("Unable to process '{field}' query; bad constraint type: {kind}")]
    BadType { field: ConstraintField, kind: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Pattern already translated to the store's wildcard syntax.
    Like(String),
    Eq(String),
    In(Vec<String>),
}

impl Constraint {
    pub fn parse(field: ConstraintField, raw: &str) -> Result<Self, ConstraintError> {
        let (kind, expression) = raw.split_once('.').ok_or_else(|| ConstraintError::BadType {
            field,
            kind: raw.to_string(),
        })?;

        match kind {
            "like" => Ok(Constraint::Like(expression.replace('*', "%"))),
            "eq" => Ok(Constraint::Eq(expression.to_string())),
            "in" => {
                let inner = expression.strip_prefix('(').unwrap_or(expression);
                let inner = inner.strip_suffix(')').unwrap_or(inner);
                Ok(Constraint::In(
                    inner.split(',').map(str::to_string).collect(),
                ))
            }
            other => Err(ConstraintError::BadType {
                field,
                kind: other.to_string(),
            }),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Constraint::Like(_) => "like",
            Constraint::Eq(_) => "eq",
            Constraint::In(_) => "in",
        }
    }
}

/// A parsed constraint together with the parameter it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldConstraint {
    pub field: ConstraintField,
    pub constraint: Constraint,
}

impl FieldConstraint {
    /// The `label` parameter takes precedence over `curie` when both are given.
    pub fn select(
        label: Option<&str>,
        curie: Option<&str>,
    ) -> Result<Option<Self>, ConstraintError> {
        let picked = match (label, curie) {
            (Some(raw), _) if !raw.is_empty() => Some((ConstraintField::Label, raw)),
            (_, Some(raw)) if !raw.is_empty() => Some((ConstraintField::Curie, raw)),
            _ => None,
        };

        picked
            .map(|(field, raw)| {
                Constraint::parse(field, raw).map(|constraint| FieldConstraint { field, constraint })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_translates_wildcards() {
        let c = Constraint::parse(ConstraintField::Curie, "like.ONTIE:0*").unwrap();
        assert_eq!(c, Constraint::Like("ONTIE:0%".to_string()));
    }

    #[test]
    fn test_eq_keeps_expression_verbatim() {
        let c = Constraint::parse(ConstraintField::Label, "eq.Disease*").unwrap();
        assert_eq!(c, Constraint::Eq("Disease*".to_string()));
    }

    #[test]
    fn test_expression_may_contain_dots() {
        let c = Constraint::parse(ConstraintField::Label, "eq.3.5 mg").unwrap();
        assert_eq!(c, Constraint::Eq("3.5 mg".to_string()));
    }

    #[test]
    fn test_in_splits_parenthesised_list() {
        let c = Constraint::parse(ConstraintField::Curie, "in.(a,b,c)").unwrap();
        assert_eq!(
            c,
            Constraint::In(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );

        let bare = Constraint::parse(ConstraintField::Curie, "in.a,b").unwrap();
        assert_eq!(bare, Constraint::In(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let err = Constraint::parse(ConstraintField::Label, "gt.5").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to process 'label' query; bad constraint type: gt"
        );
    }

    #[test]
    fn test_missing_separator_is_rejected() {
        let err = Constraint::parse(ConstraintField::Curie, "Disease").unwrap_err();
        assert_eq!(
            err,
            ConstraintError::BadType {
                field: ConstraintField::Curie,
                kind: "Disease".to_string()
            }
        );
    }

    #[test]
    fn test_label_wins_over_curie() {
        let picked = FieldConstraint::select(Some("eq.Disease"), Some("like.DOID:*"))
            .unwrap()
            .unwrap();
        assert_eq!(picked.field, ConstraintField::Label);

        let curie_only = FieldConstraint::select(None, Some("like.DOID:*")).unwrap().unwrap();
        assert_eq!(curie_only.field, ConstraintField::Curie);

        assert!(FieldConstraint::select(None, None).unwrap().is_none());
    }
}
