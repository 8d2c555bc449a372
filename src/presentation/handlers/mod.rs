mod analyze;
mod auth;
mod error;
mod export;
mod health;
mod images;
mod upload;

pub use analyze::analyze_handler;
pub use auth::{login_handler, logout_handler, me_handler, register_handler};
pub use error::{ErrorResponse, error_response};
pub use export::{export_csv_handler, export_json_handler, export_zip_handler};
pub use health::health_handler;
pub use images::{
    batch_delete_handler, cleanup_handler, delete_all_handler, delete_image_handler,
    list_images_handler, rename_image_handler,
};
pub use upload::upload_handler;
