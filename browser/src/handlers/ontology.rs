//! Routes for the default resource: single-term exports, the class tree and label search.

use actix_web::{web, HttpResponse};
use minijinja::context;
use ontobrowse_models::OutputFormat;

use super::params::{headers_requested, value_format, ExportQuery, TreeQuery};
use crate::errors::{BrowserError, BrowserResult};
use crate::services::export::TreeOptions;
use crate::services::formatter::{predicate_list, render_terms, typed_response, RenderOptions};
use crate::services::templates::TREE_TEMPLATE;
use crate::state::AppState;

/// `GET /ontology/{term_id}.{fmt}`
pub async fn term_export(
    path: web::Path<(String, String)>,
    query: web::Query<ExportQuery>,
    state: web::Data<AppState>,
) -> BrowserResult<HttpResponse> {
    let (term_id, fmt) = path.into_inner();
    let format = OutputFormat::from_name(&fmt)
        .filter(|f| matches!(f, OutputFormat::Json | OutputFormat::Tsv | OutputFormat::Csv))
        .ok_or_else(|| {
            BrowserError::BadRequest(format!(
                "Unknown format requested (must be json, tsv or csv): {fmt}"
            ))
        })?;
    let term_id = term_id.replacen('_', ":", 1);

    let resource = state.default_resource()?;
    let mut conn = state.databases.open(resource).await?;

    let options = RenderOptions {
        no_headers: !headers_requested(&query.show_headers),
        value_format: value_format(&query.compact),
        no_hierarchy: true,
    };
    let predicates = predicate_list(query.select.as_deref(), options.value_format);

    let body = render_terms(
        state.exporter.as_ref(),
        &mut conn,
        &[term_id],
        Some(predicates.as_slice()),
        format,
        &options,
    )
    .await?;
    Ok(typed_response(body, format))
}

/// `GET /ontology`
pub async fn ontology_root(
    query: web::Query<TreeQuery>,
    state: web::Data<AppState>,
) -> BrowserResult<HttpResponse> {
    tree_or_search(None, query.into_inner(), &state).await
}

/// `GET /ontology/{term_id}`
pub async fn ontology_term(
    path: web::Path<String>,
    query: web::Query<TreeQuery>,
    state: web::Data<AppState>,
) -> BrowserResult<HttpResponse> {
    tree_or_search(Some(path.into_inner()), query.into_inner(), &state).await
}

async fn tree_or_search(
    term_id: Option<String>,
    query: TreeQuery,
    state: &AppState,
) -> BrowserResult<HttpResponse> {
    let resource = state.default_resource()?;
    let mut conn = state.databases.open(resource).await?;

    if query.format.as_deref() == Some("json") {
        let text = query.text.unwrap_or_default();
        let results = state
            .exporter
            .search(&mut conn, &text, state.config.search_limit)
            .await?;
        return Ok(HttpResponse::Ok()
            .content_type(OutputFormat::Json.content_type())
            .body(results));
    }

    let href = if term_id.is_some() {
        "./{curie}"
    } else {
        "ontology/{curie}"
    };
    let options = TreeOptions {
        title: format!("{} Browser", resource.code),
        href: href.to_string(),
        include_search: true,
    };
    let fragment = state
        .exporter
        .tree(&mut conn, term_id.as_deref(), &options)
        .await?;

    let html = state
        .templates
        .render(
            TREE_TEMPLATE,
            context! {
                title => options.title,
                resource => resource,
                term_id => term_id,
                content => fragment,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().content_type(OutputFormat::Html.content_type()).body(html))
}
