use std::env;

use crate::workflows::enforcement::{DeliveryMethod, EngineConfig};

/// Distinguishes runtime behavior for different stages of the service.
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

/// Top-level configuration for the engine.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub engine: EngineConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let defaults = EngineConfig::default();
        let engine = EngineConfig {
            follow_up_window_days: positive_days(
                "DISPUTE_FOLLOW_UP_DAYS",
                defaults.follow_up_window_days,
            )?,
            estimated_completion_days: positive_days(
                "DISPUTE_ESTIMATED_COMPLETION_DAYS",
                defaults.estimated_completion_days,
            )?,
            enhancement_min_ratio: unit_interval(
                "DISPUTE_ENHANCEMENT_MIN_RATIO",
                defaults.enhancement_min_ratio,
            )?,
            fallback_success_probability: unit_interval(
                "DISPUTE_FALLBACK_SUCCESS_PROBABILITY",
                defaults.fallback_success_probability,
            )?,
            default_delivery_method: delivery_method(
                "DISPUTE_DELIVERY_METHOD",
                defaults.default_delivery_method,
            )?,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            engine,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn positive_days(var: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|days| *days > 0)
            .ok_or(ConfigError::InvalidDays { var }),
    }
}

fn unit_interval(var: &'static str, default: f32) -> Result<f32, ConfigError> {
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse::<f32>()
            .ok()
            .filter(|value| (0.0..=1.0).contains(value))
            .ok_or(ConfigError::InvalidRatio { var }),
    }
}

fn delivery_method(
    var: &'static str,
    default: DeliveryMethod,
) -> Result<DeliveryMethod, ConfigError> {
    match env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(DeliveryMethod::Email),
            "mail" => Ok(DeliveryMethod::Mail),
            "fax" => Ok(DeliveryMethod::Fax),
            _ => Err(ConfigError::InvalidDeliveryMethod { value: raw }),
        },
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive whole number of days")]
    InvalidDays { var: &'static str },
    #[error("{var} must be a number between 0 and 1")]
    InvalidRatio { var: &'static str },
    #[error("unrecognized delivery method '{value}', expected email, mail, or fax")]
    InvalidDeliveryMethod { value: String },
}
