pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::services::{
    ai_service::GeminiService, question_service::QuestionService, resume_service::ResumeService,
    session_service::SessionService,
};
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub ai_service: GeminiService,
    pub question_service: QuestionService,
    pub session_service: SessionService,
    pub resume_service: ResumeService,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");

        let ai_service = GeminiService::new(
            config.google_api_key.clone(),
            config.gemini_base_url.clone(),
            config.gemini_model.clone(),
            http_client,
            Duration::from_secs(config.ai_timeout_secs),
        );
        let question_service = QuestionService::new(ai_service.clone());
        let session_service = SessionService::new(storage.clone(), ai_service.clone());
        let resume_service = ResumeService::new(config.uploads_dir.clone());

        Self {
            storage,
            ai_service,
            question_service,
            session_service,
            resume_service,
        }
    }
}
