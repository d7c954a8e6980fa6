//! Compiles `label`/`curie` constraints into identifier queries.
//!
//! User input only ever reaches SQL as bind parameters; the entity column is
//! chosen from [`EntityKind`], never from the request.

use ontobrowse_models::{
    Constraint, ConstraintField, EntityKind, FieldConstraint, Resource, OWL_CLASS,
    PROPERTY_KINDS, RDFS_LABEL, RDF_TYPE,
};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};
use std::collections::HashSet;

use crate::errors::BrowserResult;

/// Returns the matching identifiers, de-duplicated, in the store's natural order.
pub async fn term_ids(
    conn: &mut SqliteConnection,
    resource: &Resource,
    kind: EntityKind,
    constraint: Option<&FieldConstraint>,
) -> BrowserResult<Vec<String>> {
    let mut query = build_query(resource, kind, constraint);
    let rows = query.build().fetch_all(&mut *conn).await?;

    let mut seen = HashSet::with_capacity(rows.len());
    let mut ids = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(id) = row.try_get::<Option<String>, _>(0)? {
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
    }

    tracing::debug!(
        resource = %resource.code,
        kind = %kind,
        matches = ids.len(),
        "Compiled term query"
    );
    Ok(ids)
}

pub(crate) fn build_query<'a>(
    resource: &Resource,
    kind: EntityKind,
    constraint: Option<&FieldConstraint>,
) -> QueryBuilder<'a, Sqlite> {
    match constraint {
        Some(FieldConstraint { field: ConstraintField::Label, constraint }) => {
            let mut qb = QueryBuilder::new("SELECT DISTINCT subject FROM statements WHERE predicate = ");
            qb.push_bind(RDFS_LABEL.to_string()).push(" AND value");
            push_match(&mut qb, constraint);
            if kind == EntityKind::Predicate {
                qb.push(" AND subject IN (SELECT subject FROM statements WHERE predicate = ");
                qb.push_bind(RDF_TYPE.to_string()).push(" AND object");
                push_in(&mut qb, PROPERTY_KINDS.iter().map(|k| k.to_string()));
                qb.push(")");
            }
            qb
        }
        Some(FieldConstraint { field: ConstraintField::Curie, constraint }) => {
            let column = kind.column();
            let mut qb = QueryBuilder::new(format!(
                "SELECT DISTINCT {column} FROM statements WHERE {column}"
            ));
            push_match(&mut qb, constraint);
            qb
        }
        None => default_query(resource, kind),
    }
}

fn default_query<'a>(resource: &Resource, kind: EntityKind) -> QueryBuilder<'a, Sqlite> {
    let mut qb = QueryBuilder::new("SELECT DISTINCT subject FROM statements WHERE predicate = ");
    qb.push_bind(RDF_TYPE.to_string()).push(" AND object");

    match kind {
        EntityKind::Subject => {
            qb.push(" = ").push_bind(OWL_CLASS.to_string());
            if resource.is_aggregate() {
                // Skip blank nodes
                qb.push(" AND subject NOT LIKE ")
                    .push_bind("\\_:%".to_string())
                    .push(" ESCAPE '\\'");
            } else {
                qb.push(" AND subject LIKE ")
                    .push_bind(format!("{}:%", resource.code));
            }
        }
        EntityKind::Predicate => {
            push_in(&mut qb, PROPERTY_KINDS.iter().map(|k| k.to_string()));
        }
    }
    qb
}

fn push_match(qb: &mut QueryBuilder<'_, Sqlite>, constraint: &Constraint) {
    match constraint {
        Constraint::Like(pattern) => {
            qb.push(" LIKE ").push_bind(pattern.clone());
        }
        Constraint::Eq(value) => {
            qb.push(" = ").push_bind(value.clone());
        }
        Constraint::In(values) => push_in(qb, values.iter().cloned()),
    }
}

fn push_in(qb: &mut QueryBuilder<'_, Sqlite>, values: impl Iterator<Item = String>) {
    qb.push(" IN (");
    let mut separated = qb.separated(", ");
    for value in values {
        separated.push_bind(value);
    }
    separated.push_unseparated(")");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ontie_fixture;

    fn ontie() -> Resource {
        Resource::new("ONTIE", "Ontology for Immune Epitopes")
    }

    fn constraint(field: ConstraintField, raw: &str) -> FieldConstraint {
        FieldConstraint {
            field,
            constraint: Constraint::parse(field, raw).unwrap(),
        }
    }

    #[test]
    fn test_user_input_never_reaches_sql_text() {
        let hostile = constraint(ConstraintField::Label, "eq.x' OR '1'='1");
        let qb = build_query(&ontie(), EntityKind::Subject, Some(&hostile));
        assert!(!qb.sql().contains("OR '1'"));
        assert!(qb.sql().contains("value = ?"));

        let listed = constraint(ConstraintField::Curie, "in.(a,b,c)");
        let qb = build_query(&ontie(), EntityKind::Predicate, Some(&listed));
        assert_eq!(
            qb.sql(),
            "SELECT DISTINCT predicate FROM statements WHERE predicate IN (?, ?, ?)"
        );
    }

    #[tokio::test]
    async fn test_default_subjects_are_namespaced_classes() {
        let (_dir, mut conn) = ontie_fixture().await;
        let ids = term_ids(&mut conn, &ontie(), EntityKind::Subject, None).await.unwrap();
        assert_eq!(ids, vec!["ONTIE:0001", "ONTIE:0002", "ONTIE:0003"]);
    }

    #[tokio::test]
    async fn test_aggregate_resource_skips_blank_nodes() {
        let (_dir, mut conn) = ontie_fixture().await;
        let all = Resource::new("all", "All resources");
        let ids = term_ids(&mut conn, &all, EntityKind::Subject, None).await.unwrap();
        assert!(ids.contains(&"DOID:4".to_string()));
        assert!(ids.contains(&"ONTIE:0001".to_string()));
        assert!(!ids.iter().any(|id| id.starts_with("_:")));
    }

    #[tokio::test]
    async fn test_default_predicates_are_properties() {
        let (_dir, mut conn) = ontie_fixture().await;
        let ids = term_ids(&mut conn, &ontie(), EntityKind::Predicate, None).await.unwrap();
        assert_eq!(ids, vec!["ONTIE:0100", "rdfs:label"]);
    }

    #[tokio::test]
    async fn test_label_eq() {
        let (_dir, mut conn) = ontie_fixture().await;
        let c = constraint(ConstraintField::Label, "eq.Disease");
        let ids = term_ids(&mut conn, &ontie(), EntityKind::Subject, Some(&c)).await.unwrap();
        assert_eq!(ids, vec!["ONTIE:0001"]);
    }

    #[tokio::test]
    async fn test_label_like_on_predicates_only_returns_properties() {
        let (_dir, mut conn) = ontie_fixture().await;
        let c = constraint(ConstraintField::Label, "like.*a*");
        let ids = term_ids(&mut conn, &ontie(), EntityKind::Predicate, Some(&c)).await.unwrap();
        assert_eq!(ids, vec!["ONTIE:0100", "rdfs:label"]);
    }

    #[tokio::test]
    async fn test_curie_like() {
        let (_dir, mut conn) = ontie_fixture().await;
        let c = constraint(ConstraintField::Curie, "like.ONTIE:000*");
        let ids = term_ids(&mut conn, &ontie(), EntityKind::Subject, Some(&c)).await.unwrap();
        assert_eq!(ids, vec!["ONTIE:0001", "ONTIE:0002", "ONTIE:0003"]);
    }

    #[tokio::test]
    async fn test_curie_in_returns_present_subset_in_store_order() {
        let (_dir, mut conn) = ontie_fixture().await;
        let c = constraint(ConstraintField::Curie, "in.(ONTIE:0003,ONTIE:9999,ONTIE:0001)");
        let ids = term_ids(&mut conn, &ontie(), EntityKind::Subject, Some(&c)).await.unwrap();
        assert_eq!(ids, vec!["ONTIE:0001", "ONTIE:0003"]);
    }

    #[tokio::test]
    async fn test_hostile_input_matches_nothing() {
        let (_dir, mut conn) = ontie_fixture().await;
        let c = constraint(ConstraintField::Label, "eq.x' OR '1'='1");
        let ids = term_ids(&mut conn, &ontie(), EntityKind::Subject, Some(&c)).await.unwrap();
        assert!(ids.is_empty());
    }
}
