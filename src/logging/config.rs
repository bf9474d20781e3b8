/// Logging settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub environment: String,
    pub level: String,
    pub directory: String,
}

impl LogConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Filter directive used when RUST_LOG is not set
    pub fn default_directive(&self) -> String {
        format!(
            "predimaint_backend={},tower_http=debug,axum=debug",
            self.level
        )
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
            if environment == "production" {
                "info".to_string()
            } else {
                "debug".to_string()
            }
        });
        let directory = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        Self {
            environment,
            level,
            directory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_targets_crate() {
        let config = LogConfig {
            environment: "production".to_string(),
            level: "info".to_string(),
            directory: "logs".to_string(),
        };
        assert!(config.is_production());
        assert!(config
            .default_directive()
            .starts_with("predimaint_backend=info"));
    }

    #[test]
    fn test_default_has_level_and_directory() {
        let config = LogConfig::default();
        assert!(!config.level.is_empty());
        assert!(!config.directory.is_empty());
    }
}
