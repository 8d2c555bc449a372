use std::sync::Arc;

use crate::application::ports::SessionCodec;
use crate::application::services::{
    AnalysisService, AuthService, ExportService, ImageService, RetentionSweeper,
};
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub image_service: Arc<ImageService>,
    pub analysis_service: Arc<AnalysisService>,
    pub export_service: Arc<ExportService>,
    pub auth_service: Arc<AuthService>,
    pub retention_sweeper: Arc<RetentionSweeper>,
    pub sessions: Arc<dyn SessionCodec>,
    pub settings: Settings,
}
