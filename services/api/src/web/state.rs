//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use sermon_study_core::ports::{
    AuthService, StudyExportService, TextGenerationService, VideoMetadataService,
};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. Everything in here is immutable after construction; each
/// generation request runs independently against these services.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<dyn TextGenerationService>,
    pub video: Arc<dyn VideoMetadataService>,
    pub auth: Arc<dyn AuthService>,
    pub export: Arc<dyn StudyExportService>,
}
