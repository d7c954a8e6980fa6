use actix_cors::Cors;
use actix_web::{App, HttpServer};
use anyhow::Context;
use ontobrowse_config::BrowserConfig;
use ontobrowse_observability::{init_tracing, observability, TracingConfig};
use ontology_browser::{configure_app, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(TracingConfig::for_service("ontology-browser"));

    let config = BrowserConfig::load().context("Invalid browser configuration")?;
    let (host, port) = config.bind_address();

    tracing::info!(
        resources = config.registry.len(),
        build_dir = %config.build_dir.display(),
        templates_dir = %config.templates_dir.display(),
        default_resource = %config.default_resource,
        "Loaded configuration"
    );

    let state = AppState::new(config);

    tracing::info!("Starting ontology browser on {}:{}", host, port);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(observability("ontology-browser"))
            .configure(configure_app(state.clone()))
    })
    .bind((host.as_str(), port))
    .with_context(|| format!("Unable to bind {host}:{port}"))?
    .run()
    .await?;

    Ok(())
}
