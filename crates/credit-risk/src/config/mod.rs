use crate::pipeline::is_csv_path;
use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_INPUT: &str = "data/german_credit_data.csv";
const DEFAULT_OUTPUT: &str = "data/risk_report.csv";

/// Distinguishes runtime behavior for different stages of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub pipeline: PipelineConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let input_path = path_var("CREDIT_RISK_INPUT")?.unwrap_or_else(|| DEFAULT_INPUT.into());
        let output_path = path_var("CREDIT_RISK_OUTPUT")?.unwrap_or_else(|| DEFAULT_OUTPUT.into());
        let rules_path = path_var("CREDIT_RISK_RULES")?;
        let processed_output = path_var("CREDIT_RISK_PROCESSED_OUTPUT")?;

        let pipeline = PipelineConfig {
            input_path,
            output_path,
            rules_path,
            processed_output,
        };
        pipeline.validate()?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            pipeline,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn path_var(key: &'static str) -> Result<Option<PathBuf>, ConfigError> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::EmptyPath { key }),
        Ok(value) => Ok(Some(PathBuf::from(value.trim()))),
        Err(_) => Ok(None),
    }
}

/// Where the pipeline reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub rules_path: Option<PathBuf>,
    pub processed_output: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_csv_path(&self.output_path) {
            return Err(ConfigError::NotCsv {
                path: self.output_path.clone(),
            });
        }
        if let Some(path) = self.processed_output.as_deref().filter(|path| !is_csv_path(path)) {
            return Err(ConfigError::NotCsv {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyPath { key: &'static str },
    NotCsv { path: PathBuf },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyPath { key } => write!(f, "{key} cannot be blank"),
            ConfigError::NotCsv { path } => {
                write!(f, "output path {} must end in .csv", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("CREDIT_RISK_INPUT");
        env::remove_var("CREDIT_RISK_OUTPUT");
        env::remove_var("CREDIT_RISK_RULES");
        env::remove_var("CREDIT_RISK_PROCESSED_OUTPUT");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(
            config.pipeline.input_path,
            PathBuf::from("data/german_credit_data.csv")
        );
        assert_eq!(config.pipeline.output_path, PathBuf::from("data/risk_report.csv"));
        assert!(config.pipeline.rules_path.is_none());
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn load_reads_pipeline_paths_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        env::set_var("CREDIT_RISK_INPUT", "in/credit.csv");
        env::set_var("CREDIT_RISK_RULES", "rules.json");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.pipeline.input_path, PathBuf::from("in/credit.csv"));
        assert_eq!(config.pipeline.rules_path, Some(PathBuf::from("rules.json")));
        reset_env();
    }

    #[test]
    fn rejects_non_csv_report_path() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CREDIT_RISK_OUTPUT", "report.xlsx");
        let error = AppConfig::load().expect_err("xlsx rejected");
        assert!(matches!(error, ConfigError::NotCsv { .. }));
        reset_env();
    }

    #[test]
    fn rejects_blank_paths() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CREDIT_RISK_INPUT", "  ");
        let error = AppConfig::load().expect_err("blank rejected");
        assert!(matches!(error, ConfigError::EmptyPath { key: "CREDIT_RISK_INPUT" }));
        reset_env();
    }

    #[test]
    fn validate_shares_the_report_writer_extension_check() {
        let mut config = PipelineConfig {
            input_path: PathBuf::from("raw.csv"),
            output_path: PathBuf::from("out/REPORT.CSV"),
            rules_path: None,
            processed_output: Some(PathBuf::from("out/processed.txt")),
        };
        let error = config.validate().expect_err("txt rejected");
        assert!(matches!(error, ConfigError::NotCsv { ref path } if path.ends_with("processed.txt")));

        config.processed_output = Some(PathBuf::from("out/processed.csv"));
        assert!(config.validate().is_ok());
    }
}
