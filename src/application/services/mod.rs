mod analysis_service;
mod auth_service;
mod export_service;
mod image_service;
mod image_view;
mod retention_sweeper;

pub use analysis_service::{AnalysisError, AnalysisEvent, AnalysisOutcome, AnalysisService};
pub use auth_service::{AuthError, AuthMode, AuthService, SignedIn, UserSummary};
pub use export_service::{ExportError, ExportService, generate_csv, generate_json};
pub use image_service::{ImageService, ImageServiceError, SweepReport};
pub use image_view::ImageView;
pub use retention_sweeper::RetentionSweeper;
