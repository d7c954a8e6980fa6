use actix_web::{web, HttpResponse};
use minijinja::context;
use serde_json::json;

use crate::errors::BrowserResult;
use crate::services::templates::MAIN_TEMPLATE;
use crate::state::AppState;

pub async fn index(state: web::Data<AppState>) -> BrowserResult<HttpResponse> {
    let resources: Vec<_> = state.registry().iter().collect();
    let html = state
        .templates
        .render(
            MAIN_TEMPLATE,
            context! {
                title => "Ontology Browser",
                landing => true,
                default_resource => state.config.default_resource,
                resources => resources,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().content_type("text/html; charset=utf-8").body(html))
}

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let build_dir = state.databases.build_dir();
    let build_dir_status = match tokio::fs::metadata(build_dir).await {
        Ok(meta) if meta.is_dir() => "present",
        _ => "missing",
    };

    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "ontology-browser",
        "resources": state.registry().len(),
        "build_dir": build_dir_status,
        "timestamp": chrono::Utc::now()
    }))
}
