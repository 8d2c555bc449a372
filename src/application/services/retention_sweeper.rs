use std::sync::Arc;
use std::time::Duration;

use super::image_service::{ImageService, ImageServiceError, SweepReport};

pub struct RetentionSweeper {
    image_service: Arc<ImageService>,
    max_age: chrono::Duration,
    interval: Duration,
}

impl RetentionSweeper {
    pub fn new(
        image_service: Arc<ImageService>,
        max_age: chrono::Duration,
        interval: Duration,
    ) -> Self {
        Self {
            image_service,
            max_age,
            interval,
        }
    }

    pub async fn sweep_once(&self) -> Result<SweepReport, ImageServiceError> {
        self.image_service.sweep_expired(self.max_age).await
    }

    /// Sweeps forever on the configured interval. The first sweep runs
    /// immediately.
    pub async fn run(self: Arc<Self>) {
        tracing::info!(
            max_age_hours = self.max_age.num_hours(),
            interval_secs = self.interval.as_secs(),
            "Retention sweeper started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.sweep_once().await {
                Ok(report) if report.deleted_records > 0 => {
                    tracing::info!(
                        deleted_records = report.deleted_records,
                        deleted_objects = report.deleted_objects,
                        "Expired images removed"
                    );
                }
                Ok(_) => tracing::debug!("Retention sweep found nothing to remove"),
                Err(e) => tracing::error!(error = %e, "Retention sweep failed"),
            }
        }
    }
}
