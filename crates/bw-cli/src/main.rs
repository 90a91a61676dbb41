//! Breachward CLI
//!
//! Command-line interface for the Breachward breach notification service.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod api_client;
mod commands;
mod config;
mod validator;

use api_client::{ApiClient, ListIncidentsParams};
use commands::{run_server, ServeConfig};
use config::AppConfig;
use validator::ConfigValidator;

#[derive(Parser)]
#[command(name = "breachward")]
#[command(version)]
#[command(about = "Breach incident tracking and notification", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    /// API server URL (for remote commands)
    #[arg(long, default_value = "http://localhost:8080")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Database URL (overrides config)
        #[arg(short, long)]
        database: Option<String>,

        /// Disable the internal alert broadcast on incident creation
        #[arg(long)]
        no_alerts: bool,

        /// Validate configuration and exit without starting the server
        #[arg(long)]
        validate_only: bool,
    },

    /// Show API server status
    Status,

    /// Validate configuration
    Validate {
        /// Configuration file to validate
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show current configuration
    Config {
        /// Show secrets (redacted by default)
        #[arg(long)]
        show_secrets: bool,
    },

    /// Manage incidents
    Incident {
        #[command(subcommand)]
        action: IncidentCommands,
    },

    /// Manage breach notifications
    Notification {
        #[command(subcommand)]
        action: NotificationCommands,
    },
}

#[derive(Subcommand)]
enum IncidentCommands {
    /// List incidents
    List {
        /// Filter by status
        #[arg(short, long)]
        status: Option<String>,

        /// Filter by severity
        #[arg(long)]
        severity: Option<String>,

        /// Maximum number of incidents to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show incident details
    Show {
        /// Incident ID
        id: i64,
    },

    /// Update incident status
    Update {
        /// Incident ID
        id: i64,

        /// New status
        #[arg(short, long)]
        status: String,
    },
}

#[derive(Subcommand)]
enum NotificationCommands {
    /// List notifications staged for an incident
    List {
        /// Incident ID
        incident: i64,
    },

    /// Send a staged notification
    Send {
        /// Notification ID
        id: i64,

        /// Staff user id to record as sender
        #[arg(short, long)]
        actor: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = AppConfig::load(&config_path).unwrap_or_else(|_| {
        if cli.verbose {
            eprintln!("Using default configuration (no config file found)");
        }
        AppConfig::default()
    });

    // Initialize logging
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config
            .logging
            .level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    };

    bw_observability::logging::init_logging_with_config(bw_observability::logging::LoggingConfig {
        level: log_level,
        json_format: config.logging.json_format,
        ..Default::default()
    });

    // Execute command
    match cli.command {
        Commands::Serve {
            port,
            host,
            database,
            no_alerts,
            validate_only,
        } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(database) = database {
                config.database.url = database;
            }
            if no_alerts {
                config.alerts.enabled = false;
            }

            let serve_config = ServeConfig {
                port: config.server.port,
                host: config.server.host.clone(),
                database_url: config.database.url.clone(),
                timeout_secs: config.server.request_timeout_secs,
                run_migrations: config.database.run_migrations,
                alerts_enabled: config.alerts.enabled,
            };

            cmd_serve(serve_config, config, validate_only).await
        }
        Commands::Status => cmd_status(cli.format, &cli.api_url).await,
        Commands::Validate { config: cfg_path } => {
            cmd_validate(cfg_path.unwrap_or(config_path)).await
        }
        Commands::Config { show_secrets } => cmd_config(config, show_secrets, cli.format).await,
        Commands::Incident { action } => cmd_incident(action, cli.format, &cli.api_url).await,
        Commands::Notification { action } => {
            cmd_notification(action, cli.format, &cli.api_url).await
        }
    }
}

fn default_config_path() -> PathBuf {
    if let Some(dirs) = directories::ProjectDirs::from("com", "breachward", "breachward") {
        dirs.config_dir().join("config.yaml")
    } else {
        PathBuf::from("config/default.yaml")
    }
}

async fn cmd_serve(
    serve_config: ServeConfig,
    app_config: AppConfig,
    validate_only: bool,
) -> Result<()> {
    println!("{}", "Validating configuration...".cyan());

    let validation_result = ConfigValidator::validate(&app_config);
    validation_result.print();

    if validate_only {
        if validation_result.has_errors() {
            println!();
            println!(
                "{}",
                "Configuration validation failed. Fix the errors above before starting the server."
                    .red()
                    .bold()
            );
            std::process::exit(1);
        } else {
            println!();
            println!(
                "{}",
                "Configuration is valid. Server can be started."
                    .green()
                    .bold()
            );
            return Ok(());
        }
    }

    if validation_result.has_errors() {
        println!();
        println!(
            "{}",
            "Server startup aborted due to configuration errors. Fix the errors above and try again."
                .red()
                .bold()
        );
        std::process::exit(1);
    }

    println!();
    run_server(serve_config, app_config).await
}

async fn cmd_status(format: OutputFormat, api_url: &str) -> Result<()> {
    let client = ApiClient::new(api_url)?;

    match client.health().await {
        Ok(health) => {
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&health)?);
            } else {
                println!("{}", "Breachward Status".bold());
                println!("─────────────────");
                let status = if health.status == "ok" {
                    health.status.green()
                } else {
                    health.status.yellow()
                };
                println!("Server: {}", status);
                println!("Database: {}", health.database);
                println!("Version: {}", health.version);
            }
        }
        Err(e) => {
            println!("{}: {}", "Error".red(), e);
            println!("Make sure the API server is running (breachward serve)");
        }
    }

    Ok(())
}

async fn cmd_validate(config_path: PathBuf) -> Result<()> {
    println!(
        "Validating configuration: {}",
        config_path.display().to_string().cyan()
    );

    let config = match AppConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("{}: {}", "Configuration file error".red().bold(), e);
            std::process::exit(1);
        }
    };

    let validation_result = ConfigValidator::validate(&config);
    validation_result.print();

    let redacted = config.redact_secrets();
    println!();
    println!("{}", "Configuration Summary".bold());
    println!("─────────────────────");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", redacted.database.url);
    println!("  Mailer: {}", config.mailer.transport);
    println!(
        "  Alerts: {}",
        if config.alerts.enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    if validation_result.has_errors() {
        println!();
        println!(
            "{}",
            "Configuration validation failed. Fix the errors above."
                .red()
                .bold()
        );
        std::process::exit(1);
    } else if validation_result.has_warnings() {
        println!();
        println!(
            "{}",
            "Configuration is valid with warnings. Review the warnings above."
                .yellow()
                .bold()
        );
    } else {
        println!();
        println!("{}", "Configuration is valid.".green().bold());
    }

    Ok(())
}

async fn cmd_config(config: AppConfig, show_secrets: bool, format: OutputFormat) -> Result<()> {
    let display_config = if show_secrets {
        config
    } else {
        config.redact_secrets()
    };

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&display_config)?);
    } else {
        print!("{}", serde_yaml::to_string(&display_config)?);
    }

    Ok(())
}

async fn cmd_incident(action: IncidentCommands, format: OutputFormat, api_url: &str) -> Result<()> {
    let client = ApiClient::new(api_url)?;

    match action {
        IncidentCommands::List {
            status,
            severity,
            limit,
        } => {
            let params = ListIncidentsParams {
                status,
                severity,
                limit: Some(limit),
                ..Default::default()
            };

            match client.list_incidents(&params).await {
                Ok(response) => {
                    if format == OutputFormat::Json {
                        println!("{}", serde_json::to_string_pretty(&response)?);
                    } else {
                        println!("{}", "Incidents".bold());
                        println!("─────────");
                        if response.incidents.is_empty() {
                            println!("No incidents found");
                        } else {
                            for incident in &response.incidents {
                                let severity = match incident.severity.as_str() {
                                    "critical" => incident.severity.red(),
                                    "high" => incident.severity.yellow(),
                                    "medium" => incident.severity.cyan(),
                                    _ => incident.severity.white(),
                                };
                                println!(
                                    "  #{} [{}] {} - {}",
                                    incident.id.to_string().cyan(),
                                    severity,
                                    incident.status,
                                    incident.incident_type
                                );
                            }
                            println!();
                            println!(
                                "Showing {} of {} (offset {})",
                                response.incidents.len(),
                                response.total,
                                response.offset
                            );
                        }
                    }
                }
                Err(e) => {
                    println!("{}: {}", "Error".red(), e);
                    println!("Make sure the API server is running (breachward serve)");
                }
            }
        }
        IncidentCommands::Show { id } => match client.get_incident(id).await {
            Ok(incident) => {
                if format == OutputFormat::Json {
                    println!("{}", serde_json::to_string_pretty(&incident)?);
                } else {
                    println!("{} #{}", "Incident".bold(), incident.id);
                    println!("─────────────────────────────────────────");
                    println!("  {} {}", "Type:".cyan(), incident.incident_type);
                    println!("  {} {}", "Severity:".cyan(), incident.severity);
                    println!("  {} {}", "Status:".cyan(), incident.status);
                    println!("  {} {}", "Detected:".cyan(), incident.detected_at);
                    println!("  {} {}", "Description:".cyan(), incident.description);
                    if !incident.affected_users.is_empty() {
                        println!(
                            "  {} {}",
                            "Affected users:".cyan(),
                            incident.affected_users.join(", ")
                        );
                    }
                    if !incident.affected_data_types.is_empty() {
                        println!(
                            "  {} {}",
                            "Data types:".cyan(),
                            incident.affected_data_types.join(", ")
                        );
                    }
                }
            }
            Err(e) => {
                println!("{}: {}", "Error".red(), e);
            }
        },
        IncidentCommands::Update { id, status } => {
            match client.update_incident_status(id, &status).await {
                Ok(incident) => {
                    println!(
                        "{} incident #{} is now '{}'",
                        "Updated:".green(),
                        incident.id,
                        incident.status
                    );
                }
                Err(e) => {
                    println!("{}: {}", "Error".red(), e);
                }
            }
        }
    }

    Ok(())
}

async fn cmd_notification(
    action: NotificationCommands,
    format: OutputFormat,
    api_url: &str,
) -> Result<()> {
    let client = ApiClient::new(api_url)?;

    match action {
        NotificationCommands::List { incident } => match client.list_notifications(incident).await {
            Ok(notifications) => {
                if format == OutputFormat::Json {
                    println!("{}", serde_json::to_string_pretty(&notifications)?);
                } else {
                    println!("{} for incident #{}", "Notifications".bold(), incident);
                    println!("──────────────────────────────");
                    if notifications.is_empty() {
                        println!("No notifications staged");
                    } else {
                        for notification in &notifications {
                            let status = match notification.status.as_str() {
                                "sent" => notification.status.green(),
                                "failed" => notification.status.red(),
                                _ => notification.status.yellow(),
                            };
                            println!(
                                "  #{} [{}] {} -> {}",
                                notification.id,
                                status,
                                notification.notification_type,
                                notification.recipient_email
                            );
                            if let Some(error) = &notification.error_message {
                                println!("      {} {}", "last error:".red(), error);
                            }
                        }
                    }
                }
            }
            Err(e) => {
                println!("{}: {}", "Error".red(), e);
            }
        },
        NotificationCommands::Send { id, actor } => {
            match client.send_notification(id, actor).await {
                Ok(notification) => match notification.status.as_str() {
                    "sent" => {
                        println!(
                            "{} notification #{} to {}",
                            "Sent:".green(),
                            notification.id,
                            notification.recipient_email
                        );
                    }
                    status => {
                        println!(
                            "{} notification #{} is '{}'",
                            "Not delivered:".red(),
                            notification.id,
                            status
                        );
                        if let Some(error) = &notification.error_message {
                            println!("  {}", error);
                        }
                    }
                },
                Err(e) => {
                    println!("{}: {}", "Error".red(), e);
                }
            }
        }
    }

    Ok(())
}
