use async_trait::async_trait;
use minijinja::Environment;
use ontobrowse_models::{
    GraphFormat, Statement, TableFormat, OWL_CLASS, OWL_THING, RDFS_LABEL, RDFS_SUBCLASS_OF,
    RDF_TYPE,
};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection};
use std::collections::{HashMap, HashSet, VecDeque};

use super::tree::{TreeNode, TreeView};
use super::{graph, table, tree, Column, ExportOptions, ExtractOptions, TermExporter, TreeOptions};
use crate::errors::BrowserResult;
use crate::services::prefixes::PrefixResolver;

// Stay well below SQLite's bound-parameter limit
const ID_CHUNK: usize = 500;

/// Statements of one requested term, in store order.
#[derive(Debug, Clone)]
pub(crate) struct TermData {
    pub id: String,
    pub statements: Vec<Statement>,
}

/// Reads terms straight from the `statements` and `prefix` tables.
pub struct SqliteExporter {
    env: Environment<'static>,
}

impl Default for SqliteExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SqliteExporter {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }
}

#[async_trait]
impl TermExporter for SqliteExporter {
    async fn export_terms(
        &self,
        conn: &mut SqliteConnection,
        term_ids: &[String],
        predicates: Option<&[String]>,
        format: TableFormat,
        options: &ExportOptions,
    ) -> BrowserResult<String> {
        let terms = load_terms(conn, term_ids).await?;
        if terms.is_empty() {
            return Ok(String::new());
        }
        let resolver = PrefixResolver::load(conn).await?;

        let columns: Vec<Column> = match predicates {
            Some(names) => names.iter().map(|n| Column::from_name(n)).collect(),
            None => default_columns(&terms, options),
        };

        table::render(&self.env, &terms, &columns, format, options, &resolver)
    }

    async fn extract_terms(
        &self,
        conn: &mut SqliteConnection,
        term_ids: &[String],
        predicates: Option<&[String]>,
        format: GraphFormat,
        options: &ExtractOptions,
    ) -> BrowserResult<String> {
        let mut terms = load_terms(conn, term_ids).await?;
        if terms.is_empty() {
            return Ok(String::new());
        }

        if !options.no_hierarchy {
            let known: HashSet<String> = terms.iter().map(|t| t.id.clone()).collect();
            let ancestors: Vec<String> = ancestors_of(conn, &terms)
                .await?
                .into_iter()
                .filter(|id| !known.contains(id))
                .collect();
            terms.extend(load_terms(conn, &ancestors).await?);
        }

        if let Some(names) = predicates {
            let keep: HashSet<&str> = names.iter().map(|n| super::predicate_for(n)).collect();
            for term in &mut terms {
                term.statements.retain(|s| keep.contains(s.predicate.as_str()));
            }
        }

        let resolver = PrefixResolver::load(conn).await?;
        match format {
            GraphFormat::JsonLd => graph::json_ld(&terms, &resolver),
            GraphFormat::Turtle => Ok(graph::turtle(&terms, &resolver)),
        }
    }

    async fn search(
        &self,
        conn: &mut SqliteConnection,
        text: &str,
        limit: usize,
    ) -> BrowserResult<String> {
        let pattern = format!("%{}%", escape_like(text));
        let rows = sqlx::query(
            "SELECT DISTINCT subject, value FROM statements \
             WHERE predicate = ? AND value LIKE ? ESCAPE '\\' \
             ORDER BY length(value), value LIMIT ?",
        )
        .bind(RDFS_LABEL)
        .bind(pattern)
        .bind(limit as i64)
        .fetch_all(&mut *conn)
        .await?;

        let mut results = Vec::with_capacity(rows.len());
        for (order, row) in rows.iter().enumerate() {
            let id: String = row.try_get("subject")?;
            let label: Option<String> = row.try_get("value")?;
            results.push(serde_json::json!({
                "id": id,
                "label": label.unwrap_or_default(),
                "order": order + 1,
            }));
        }

        serde_json::to_string(&results)
            .map_err(|e| crate::errors::BrowserError::Internal(e.to_string()))
    }

    async fn tree(
        &self,
        conn: &mut SqliteConnection,
        term_id: Option<&str>,
        options: &TreeOptions,
    ) -> BrowserResult<String> {
        let view = match term_id {
            None => {
                let roots = top_level_classes(conn).await?;
                let labels = load_labels(conn, &roots).await?;
                TreeView {
                    term: None,
                    ancestors: Vec::new(),
                    children: nodes(&roots, &labels, &options.href),
                    annotations: Vec::new(),
                    found: true,
                }
            }
            Some(id) => {
                let terms = load_terms(conn, &[id.to_string()]).await?;
                let statements = terms.into_iter().next().map(|t| t.statements).unwrap_or_default();
                let found = !statements.is_empty();

                let mut ancestors = first_parent_chain(conn, id).await?;
                ancestors.reverse();
                let children = children_of(conn, id).await?;

                let mut wanted: Vec<String> = ancestors.clone();
                wanted.extend(children.iter().cloned());
                wanted.push(id.to_string());
                let labels = load_labels(conn, &wanted).await?;

                TreeView {
                    term: Some(tree::node(id, &labels, &options.href)),
                    ancestors: nodes(&ancestors, &labels, &options.href),
                    children: nodes(&children, &labels, &options.href),
                    annotations: statements
                        .iter()
                        .map(|s| (s.predicate.clone(), s.rendered_value().to_string()))
                        .collect(),
                    found,
                }
            }
        };

        tree::render(&self.env, &view, options)
    }
}

fn nodes(ids: &[String], labels: &HashMap<String, String>, href: &str) -> Vec<TreeNode> {
    ids.iter().map(|id| tree::node(id, labels, href)).collect()
}

/// Id column in the requested value format followed by every predicate the terms use.
fn default_columns(terms: &[TermData], options: &ExportOptions) -> Vec<Column> {
    let mut columns = vec![Column::Id {
        header: options.value_format.as_str().to_string(),
        format: options.value_format,
    }];
    let mut seen = HashSet::new();
    for statement in terms.iter().flat_map(|t| &t.statements) {
        if seen.insert(statement.predicate.clone()) {
            columns.push(Column::Predicate {
                header: statement.predicate.clone(),
                predicate: statement.predicate.clone(),
            });
        }
    }
    columns
}

/// Loads the statements of each id, keeping the order of `ids` and dropping unknown ids.
pub(crate) async fn load_terms(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> BrowserResult<Vec<TermData>> {
    let mut by_subject: HashMap<String, Vec<Statement>> = HashMap::new();

    for chunk in ids.chunks(ID_CHUNK) {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT subject, predicate, object, value, datatype, language \
             FROM statements WHERE subject IN (",
        );
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");

        let statements = qb.build_query_as::<Statement>().fetch_all(&mut *conn).await?;
        for statement in statements {
            by_subject
                .entry(statement.subject.clone())
                .or_default()
                .push(statement);
        }
    }

    let mut seen = HashSet::new();
    Ok(ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| {
            by_subject.remove(id).map(|statements| TermData {
                id: id.clone(),
                statements,
            })
        })
        .collect())
}

pub(crate) async fn load_labels(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> BrowserResult<HashMap<String, String>> {
    let mut labels = HashMap::new();
    for chunk in ids.chunks(ID_CHUNK) {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT subject, value FROM statements WHERE predicate = ");
        qb.push_bind(RDFS_LABEL.to_string()).push(" AND subject IN (");
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");

        for row in qb.build().fetch_all(&mut *conn).await? {
            let subject: String = row.try_get("subject")?;
            if let Some(value) = row.try_get::<Option<String>, _>("value")? {
                labels.entry(subject).or_insert(value);
            }
        }
    }
    Ok(labels)
}

async fn parents_of(conn: &mut SqliteConnection, id: &str) -> BrowserResult<Vec<String>> {
    let rows = sqlx::query(
        "SELECT DISTINCT object FROM statements \
         WHERE subject = ? AND predicate = ? AND object IS NOT NULL AND object NOT LIKE '\\_:%' ESCAPE '\\'",
    )
    .bind(id)
    .bind(RDFS_SUBCLASS_OF)
    .fetch_all(&mut *conn)
    .await?;
    rows.iter()
        .map(|row| row.try_get::<String, _>("object").map_err(Into::into))
        .collect()
}

async fn children_of(conn: &mut SqliteConnection, id: &str) -> BrowserResult<Vec<String>> {
    let rows = sqlx::query(
        "SELECT DISTINCT subject FROM statements WHERE predicate = ? AND object = ?",
    )
    .bind(RDFS_SUBCLASS_OF)
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;
    rows.iter()
        .map(|row| row.try_get::<String, _>("subject").map_err(Into::into))
        .collect()
}

/// Follows the first named parent upwards; stops on cycles.
async fn first_parent_chain(conn: &mut SqliteConnection, id: &str) -> BrowserResult<Vec<String>> {
    let mut chain = Vec::new();
    let mut visited = HashSet::from([id.to_string()]);
    let mut current = id.to_string();

    while let Some(parent) = parents_of(conn, &current).await?.into_iter().next() {
        if parent == OWL_THING || !visited.insert(parent.clone()) {
            break;
        }
        chain.push(parent.clone());
        current = parent;
    }
    Ok(chain)
}

/// Every named superclass of the given terms, breadth first.
async fn ancestors_of(conn: &mut SqliteConnection, terms: &[TermData]) -> BrowserResult<Vec<String>> {
    let mut visited: HashSet<String> = terms.iter().map(|t| t.id.clone()).collect();
    let mut queue: VecDeque<String> = terms.iter().map(|t| t.id.clone()).collect();
    let mut ancestors = Vec::new();

    while let Some(id) = queue.pop_front() {
        for parent in parents_of(conn, &id).await? {
            if parent != OWL_THING && visited.insert(parent.clone()) {
                ancestors.push(parent.clone());
                queue.push_back(parent);
            }
        }
    }
    Ok(ancestors)
}

/// Named classes without a named parent.
async fn top_level_classes(conn: &mut SqliteConnection) -> BrowserResult<Vec<String>> {
    let rows = sqlx::query(
        "SELECT DISTINCT subject FROM statements \
         WHERE predicate = ? AND object = ? AND subject NOT LIKE '\\_:%' ESCAPE '\\' \
         AND subject NOT IN ( \
           SELECT subject FROM statements WHERE predicate = ? AND object IS NOT NULL \
           AND object != ? AND object NOT LIKE '\\_:%' ESCAPE '\\')",
    )
    .bind(RDF_TYPE)
    .bind(OWL_CLASS)
    .bind(RDFS_SUBCLASS_OF)
    .bind(OWL_THING)
    .fetch_all(&mut *conn)
    .await?;
    rows.iter()
        .map(|row| row.try_get::<String, _>("subject").map_err(Into::into))
        .collect()
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
