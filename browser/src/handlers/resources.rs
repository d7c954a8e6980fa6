use actix_web::http::header::CONTENT_TYPE;
use actix_web::{web, HttpRequest, HttpResponse};
use minijinja::context;
use ontobrowse_models::{EntityKind, FieldConstraint, OutputFormat, Pagination, ValueFormat};
use ontobrowse_observability::TraceContextExt;
use tracing::{debug, info};

use super::params::{format_name, headers_hidden, value_format, ListingQuery, SubjectQuery};
use crate::errors::{BrowserError, BrowserResult};
use crate::services::constraints::term_ids;
use crate::services::formatter::{predicate_list, render_terms, typed_response, RenderOptions};
use crate::services::templates::{MAIN_TEMPLATE, RESOURCE_PAGE_TEMPLATE};
use crate::services::PrefixResolver;
use crate::state::AppState;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// `GET /resources`
pub async fn list_resources(state: web::Data<AppState>) -> BrowserResult<HttpResponse> {
    let resources: Vec<_> = state.registry().iter().collect();
    let html = state
        .templates
        .render(
            MAIN_TEMPLATE,
            context! { title => "Resources", resources => resources },
        )
        .await?;
    Ok(html_response(html))
}

/// `GET /resources/{resource}`
pub async fn resource_page(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> BrowserResult<HttpResponse> {
    let resource = state.resource(&path)?;
    let html = state
        .templates
        .render(
            MAIN_TEMPLATE,
            context! { title => resource.name, resource => resource },
        )
        .await?;
    Ok(html_response(html))
}

/// `GET /resources/{resource}/subject?curie=..|iri=..`
pub async fn subject(
    path: web::Path<String>,
    query: web::Query<SubjectQuery>,
    state: web::Data<AppState>,
) -> BrowserResult<HttpResponse> {
    let resource = state.resource(&path)?;

    let fmt = format_name(&query.format, "html");
    let format = OutputFormat::from_name(fmt)
        .filter(|f| {
            matches!(
                f,
                OutputFormat::Html | OutputFormat::Json | OutputFormat::Tsv | OutputFormat::Turtle
            )
        })
        .ok_or_else(|| {
            BrowserError::BadRequest(format!(
                "Unknown format requested (must be html, json, tsv or ttl): {fmt}"
            ))
        })?;

    let curie = query.curie.as_deref().filter(|c| !c.is_empty());
    let iri = query.iri.as_deref().filter(|i| !i.is_empty());
    let (requested, is_iri) = match (curie, iri) {
        (Some(curie), _) => (curie, false),
        (None, Some(iri)) => (iri, true),
        (None, None) => {
            return Err(BrowserError::BadRequest(
                "A 'curie' or 'iri' query parameter is required".to_string(),
            ))
        }
    };

    let mut conn = state.databases.open(resource).await?;
    let term_id = if is_iri {
        PrefixResolver::load(&mut conn)
            .await?
            .to_curie(requested)
            .ok_or_else(|| {
                BrowserError::Unprocessable(format!(
                    "Cannot process IRI due to unknown namespace: {requested}"
                ))
            })?
    } else {
        requested.to_string()
    };

    let options = RenderOptions {
        no_headers: headers_hidden(&query.show_headers),
        value_format: value_format(&query.compact),
        no_hierarchy: true,
    };
    // Without `select` every predicate of the term is exported
    let predicates = query
        .select
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| predicate_list(Some(s), options.value_format));

    let body = render_terms(
        state.exporter.as_ref(),
        &mut conn,
        &[term_id],
        predicates.as_deref(),
        format,
        &options,
    )
    .await?;
    Ok(typed_response(body, format))
}

/// `GET /resources/{resource}/{subjects|predicates}`
pub async fn entity_listing(
    path: web::Path<(String, String)>,
    query: web::Query<ListingQuery>,
    state: web::Data<AppState>,
) -> BrowserResult<HttpResponse> {
    let (code, entity_type) = path.into_inner();
    let resource = state.resource(&code)?;
    let kind = entity_kind(&entity_type)?;
    let format = listing_format(&query.format)?;
    let constraint = FieldConstraint::select(query.label.as_deref(), query.curie.as_deref())?;
    let pagination = Pagination::from_params(query.offset.as_deref(), query.limit.as_deref())?;

    let mut conn = state.databases.open(resource).await?;
    let ids = term_ids(&mut conn, resource, kind, constraint.as_ref()).await?;
    let window = pagination.window(&ids);
    debug!(
        resource = %resource.code,
        kind = %kind,
        total = ids.len(),
        shown = window.len(),
        "Listing terms"
    );

    let options = RenderOptions {
        no_headers: headers_hidden(&query.show_headers),
        value_format: value_format(&query.compact),
        no_hierarchy: true,
    };
    let predicates = predicate_list(query.select.as_deref(), options.value_format);
    let body = render_terms(
        state.exporter.as_ref(),
        &mut conn,
        window,
        Some(predicates.as_slice()),
        format,
        &options,
    )
    .await?;

    if format == OutputFormat::Tsv {
        return Ok(typed_response(body, format));
    }

    let html = state
        .templates
        .render(
            RESOURCE_PAGE_TEMPLATE,
            context! {
                title => resource.name,
                resource => resource,
                entity_type => kind.plural(),
                content => body.unwrap_or_default(),
                paginate => true,
                offset => pagination.offset + 1,
                last_shown => pagination.last_shown(ids.len()),
                limit => pagination.limit,
                previous_set => pagination.previous_set(),
                next_set => pagination.next_set(),
                has_previous => pagination.offset > 0,
                has_next => pagination.has_next(ids.len()),
                total => ids.len(),
                carried => carried_params(&query),
            },
        )
        .await?;
    Ok(html_response(html))
}

/// `POST /resources/{resource}/{subjects|predicates}` with a newline-separated id list.
pub async fn entity_listing_post(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    query: web::Query<ListingQuery>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> BrowserResult<HttpResponse> {
    let (code, entity_type) = path.into_inner();
    let resource = state.resource(&code)?;
    let kind = entity_kind(&entity_type)?;
    let format = listing_format(&query.format)?;

    let text = decode_body(&req, &body)?;
    let (requested, listed_format) = parse_term_list(&text);
    if requested.len() > state.config.max_post_terms {
        return Err(BrowserError::BadRequest(format!(
            "Too many terms requested: {} (limit is {})",
            requested.len(),
            state.config.max_post_terms
        )));
    }
    let values = listed_format.unwrap_or_else(|| value_format(&query.compact));

    let mut conn = state.databases.open(resource).await?;
    let ids = match values {
        ValueFormat::Iri => {
            let resolver = PrefixResolver::load(&mut conn).await?;
            resolver.curies_for(requested.iter().map(String::as_str))
        }
        ValueFormat::Curie => requested,
    };
    info!(
        trace_id = %req.trace_context().trace_id,
        resource = %resource.code,
        kind = %kind,
        terms = ids.len(),
        "Exporting posted term list"
    );

    let options = RenderOptions {
        no_headers: headers_hidden(&query.show_headers),
        value_format: values,
        no_hierarchy: true,
    };
    let predicates = predicate_list(query.select.as_deref(), values);
    let body = render_terms(
        state.exporter.as_ref(),
        &mut conn,
        &ids,
        Some(predicates.as_slice()),
        format,
        &options,
    )
    .await?;

    if format == OutputFormat::Tsv {
        return Ok(typed_response(body, format));
    }

    let html = state
        .templates
        .render(
            RESOURCE_PAGE_TEMPLATE,
            context! {
                title => resource.name,
                resource => resource,
                entity_type => kind.plural(),
                content => body.unwrap_or_default(),
                paginate => false,
            },
        )
        .await?;
    Ok(html_response(html))
}

fn entity_kind(segment: &str) -> BrowserResult<EntityKind> {
    EntityKind::from_plural(segment).ok_or_else(|| {
        BrowserError::BadRequest(format!(
            "Unknown entity type (must be subjects or predicates): {segment}"
        ))
    })
}

fn listing_format(format: &Option<String>) -> BrowserResult<OutputFormat> {
    let fmt = format_name(format, "html");
    OutputFormat::from_name(fmt)
        .filter(|f| matches!(f, OutputFormat::Html | OutputFormat::Tsv))
        .ok_or_else(|| {
            BrowserError::BadRequest(format!(
                "Unknown format requested (must be html or tsv): {fmt}"
            ))
        })
}

/// Filter and output parameters repeated on the previous/next links, url-encoded.
fn carried_params(query: &ListingQuery) -> String {
    let params = [
        ("label", &query.label),
        ("curie", &query.curie),
        ("select", &query.select),
        ("show-headers", &query.show_headers),
        ("compact", &query.compact),
    ];
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in params {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            serializer.append_pair(name, value);
        }
    }
    serializer.finish()
}

/// Raw text bodies are used as-is; form bodies carry the list in their first key.
fn decode_body(req: &HttpRequest, body: &[u8]) -> BrowserResult<String> {
    let is_form = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false);

    if is_form {
        return Ok(url::form_urlencoded::parse(body)
            .next()
            .map(|(key, _)| key.into_owned())
            .unwrap_or_default());
    }

    String::from_utf8(body.to_vec())
        .map_err(|_| BrowserError::BadRequest("Request body is not valid UTF-8".to_string()))
}

/// Splits a posted list into ids; `CURIE`/`IRI` lines switch the value format.
fn parse_term_list(text: &str) -> (Vec<String>, Option<ValueFormat>) {
    let mut ids = Vec::new();
    let mut format = None;
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.parse::<ValueFormat>() {
            Ok(f) => format = Some(f),
            Err(()) => ids.push(line.to_string()),
        }
    }
    (ids, format)
}

fn html_response(html: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(OutputFormat::Html.content_type())
        .body(html)
}
