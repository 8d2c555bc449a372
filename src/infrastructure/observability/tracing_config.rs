use crate::presentation::config::Environment;

/// How log lines are filtered and formatted.
pub struct TracingConfig {
    pub environment: Environment,
    pub json_format: bool,
}

impl TracingConfig {
    pub fn new(environment: Environment, json_format: bool) -> Self {
        Self {
            environment,
            json_format,
        }
    }

    /// Filter used when `RUST_LOG` is unset.
    pub fn default_filter(&self) -> &'static str {
        match self.environment {
            Environment::Prod => "info,tower_http=info,sqlx=warn",
            Environment::Local | Environment::Test => {
                "info,simavi=debug,tower_http=debug,sqlx=warn"
            }
        }
    }
}
