pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use crate::services::{
    context_service::ContextService, generation_service::GenerationService,
    model_service::ModelService, taxonomy_service::TaxonomyService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub generation_service: GenerationService,
    pub taxonomy_service: TaxonomyService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap();

        let context_service = ContextService::new(pool.clone());
        let model_service = ModelService::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            http_client,
        );
        let generation_service =
            GenerationService::new(pool.clone(), context_service, model_service);
        let taxonomy_service = TaxonomyService::new(pool.clone());

        Self {
            pool,
            generation_service,
            taxonomy_service,
        }
    }
}
