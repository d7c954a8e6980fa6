pub mod index;
pub mod ontology;
pub mod params;
pub mod resources;

use actix_web::web;

use crate::state::AppState;

/// Registers shared state, the POST body limit and every route.
pub fn configure_app(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let max_post_bytes = state.config.max_post_bytes;
        cfg.app_data(web::Data::new(state))
            .app_data(web::PayloadConfig::new(max_post_bytes));
        configure_routes(cfg);
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index::index))
        .route("/health", web::get().to(index::health_check))
        .route("/ontology", web::get().to(ontology::ontology_root))
        .route(
            "/ontology/{term_id}.{fmt:[^/.]+}",
            web::get().to(ontology::term_export),
        )
        .route("/ontology/{term_id}", web::get().to(ontology::ontology_term))
        .route("/resources", web::get().to(resources::list_resources))
        .route("/resources/{resource}", web::get().to(resources::resource_page))
        // Must precede the entity listing, which would otherwise claim `subject`
        .route(
            "/resources/{resource}/subject",
            web::get().to(resources::subject),
        )
        .service(
            web::resource("/resources/{resource}/{entity_type}")
                .route(web::get().to(resources::entity_listing))
                .route(web::post().to(resources::entity_listing_post)),
        );
}
