//! Configuration validation for Breachward.
//!
//! Startup validation that catches broken configuration before the server
//! binds, with warnings for settings that work but probably are not what
//! the operator intended.

use crate::config::AppConfig;
use colored::Colorize;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Critical errors that prevent startup.
    pub errors: Vec<String>,
    /// Warnings that should be addressed but don't prevent startup.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a new empty validation result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Returns true if there are any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Prints the validation result to the console.
    pub fn print(&self) {
        if !self.warnings.is_empty() {
            println!();
            println!("{}", "Configuration Warnings:".yellow().bold());
            for warning in &self.warnings {
                println!("  {} {}", "⚠".yellow(), warning);
            }
        }

        if !self.errors.is_empty() {
            println!();
            println!("{}", "Configuration Errors:".red().bold());
            for error in &self.errors {
                println!("  {} {}", "✗".red(), error);
            }
        }

        if self.errors.is_empty() && self.warnings.is_empty() {
            println!("  {} Configuration OK", "✓".green());
        }
    }
}

/// Validates application configuration before startup.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the application configuration.
    ///
    /// Returns a ValidationResult containing any errors and warnings found.
    pub fn validate(config: &AppConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        Self::validate_server(config, &mut result);
        Self::validate_database_url(config, &mut result);
        Self::validate_mailer(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_server(config: &AppConfig, result: &mut ValidationResult) {
        let address = format!("{}:{}", config.server.host, config.server.port);
        if address.parse::<std::net::SocketAddr>().is_err() {
            result.add_error(format!("Invalid server bind address: {}", address));
        }

        if config.server.port == 0 {
            result.add_warning(
                "Server port is 0; the OS will pick an ephemeral port on each start".to_string(),
            );
        }
    }

    fn validate_database_url(config: &AppConfig, result: &mut ValidationResult) {
        let url = &config.database.url;

        if url.is_empty() {
            result.add_error("Database URL is empty".to_string());
            return;
        }

        if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
            result.add_error(format!(
                "Unsupported database URL '{}': expected a postgres:// or postgresql:// URL",
                url
            ));
        }
    }

    fn validate_mailer(config: &AppConfig, result: &mut ValidationResult) {
        match config.mailer.transport.as_str() {
            "http" => {
                if config.mailer.endpoint.is_empty() {
                    result.add_error(
                        "Mailer transport is 'http' but mailer.endpoint is not set".to_string(),
                    );
                }
                if config.mailer.api_key.is_empty() {
                    result.add_warning(
                        "mailer.api_key is not set; the mail gateway request will be unauthenticated"
                            .to_string(),
                    );
                }
            }
            "log" => {
                if config.alerts.enabled {
                    result.add_warning(
                        "Mailer transport is 'log': notifications and alerts will be written to \
                         the log instead of delivered"
                            .to_string(),
                    );
                }
            }
            other => {
                result.add_error(format!(
                    "Unknown mailer transport '{}': expected 'http' or 'log'",
                    other
                ));
            }
        }

        if config.mailer.from_address.is_empty() {
            result.add_error("mailer.from_address is empty".to_string());
        }
    }

    fn validate_logging(config: &AppConfig, result: &mut ValidationResult) {
        if config.logging.level.parse::<tracing::Level>().is_err() {
            result.add_warning(format!(
                "Unknown log level '{}', falling back to 'info'",
                config.logging.level
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_warns_about_log_transport() {
        let config = AppConfig::default();
        let result = ConfigValidator::validate(&config);

        assert!(!result.has_errors());
        assert!(result.has_warnings());
        assert!(result.warnings[0].contains("log"));
    }

    #[test]
    fn test_http_transport_requires_endpoint() {
        let mut config = AppConfig::default();
        config.mailer.transport = "http".to_string();

        let result = ConfigValidator::validate(&config);
        assert!(result.has_errors());
        assert!(result.errors.iter().any(|e| e.contains("mailer.endpoint")));
    }

    #[test]
    fn test_unknown_transport_is_an_error() {
        let mut config = AppConfig::default();
        config.mailer.transport = "smtp".to_string();

        let result = ConfigValidator::validate(&config);
        assert!(result.has_errors());
    }

    #[test]
    fn test_non_postgres_url_is_an_error() {
        let mut config = AppConfig::default();
        config.database.url = "sqlite://breach.db".to_string();

        let result = ConfigValidator::validate(&config);
        assert!(result.has_errors());
        assert!(result.errors.iter().any(|e| e.contains("postgres")));
    }

    #[test]
    fn test_bad_log_level_is_only_a_warning() {
        let mut config = AppConfig::default();
        config.alerts.enabled = false;
        config.logging.level = "noisy".to_string();

        let result = ConfigValidator::validate(&config);
        assert!(!result.has_errors());
        assert!(result.warnings.iter().any(|w| w.contains("noisy")));
    }
}
