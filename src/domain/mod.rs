mod analysis_status;
pub mod filename;
mod identity;
mod image;
mod image_id;
mod storage_path;
mod user;
mod user_id;
mod vision_analysis;

pub use analysis_status::AnalysisStatus;
pub use filename::{FilenameRequest, extract_extension, generate_filename, sanitize_for_filename};
pub use identity::Identity;
pub use image::{CompletedAnalysis, Image};
pub use image_id::ImageId;
pub use storage_path::StoragePath;
pub use user::User;
pub use user_id::UserId;
pub use vision_analysis::{InvalidAnalysisOutput, VisionAnalysis};
