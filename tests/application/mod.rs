mod analysis_service_test;
mod auth_service_test;
mod export_service_test;
