use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Sample rate the upstream text-to-audio model produces.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

#[derive(Debug, Clone)]
pub struct AudiogenConfig {
    pub common: core_config::Config,
    pub output: OutputConfig,
    pub generator: GeneratorConfig,
    pub s3: S3Config,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Directory generated files are written to and served from.
    pub dir: String,
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub backend: GeneratorBackend,
    /// Inference endpoint for the http backend.
    pub endpoint: String,
    /// Readiness probe URL for the http backend; the endpoint when unset.
    pub health_url: Option<String>,
    /// Sample rate of the mock backend.
    pub sample_rate: u32,
    /// No timeout unless set.
    pub timeout_secs: Option<u64>,
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorBackend {
    Http,
    Mock,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    /// Upload is enabled only when a bucket is set.
    pub bucket: Option<String>,
    pub region: String,
    pub key_prefix: String,
}

impl AudiogenConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(AudiogenConfig {
            common: common_config,
            output: OutputConfig {
                dir: get_env("AUDIO_OUTPUT_DIR", Some("outputs"), is_prod)?,
            },
            generator: GeneratorConfig {
                backend: get_env("GENERATOR_BACKEND", Some("http"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                endpoint: get_env(
                    "GENERATOR_ENDPOINT",
                    Some("http://localhost:9000/generate"),
                    is_prod,
                )?,
                health_url: env::var("GENERATOR_HEALTH_URL")
                    .ok()
                    .filter(|u| !u.is_empty()),
                sample_rate: parse_number(
                    "GENERATOR_SAMPLE_RATE",
                    &get_env(
                        "GENERATOR_SAMPLE_RATE",
                        Some(&DEFAULT_SAMPLE_RATE.to_string()),
                        is_prod,
                    )?,
                )?,
                timeout_secs: env::var("GENERATOR_TIMEOUT_SECS")
                    .ok()
                    .map(|v| parse_number("GENERATOR_TIMEOUT_SECS", &v))
                    .transpose()?,
            },
            s3: S3Config {
                bucket: env::var("S3_BUCKET").ok().filter(|b| !b.is_empty()),
                region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                key_prefix: env::var("S3_KEY_PREFIX")
                    .unwrap_or_else(|_| "bark-outputs".to_string()),
            },
        })
    }
}

impl std::str::FromStr for GeneratorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(GeneratorBackend::Http),
            "mock" => Ok(GeneratorBackend::Mock),
            _ => Err(format!("Invalid generator backend: {}", s)),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value.trim().parse().map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!("{} must be a number, got '{}'", key, value))
    })
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("HTTP".parse::<GeneratorBackend>(), Ok(GeneratorBackend::Http));
        assert_eq!("mock".parse::<GeneratorBackend>(), Ok(GeneratorBackend::Mock));
        assert!("torch".parse::<GeneratorBackend>().is_err());
    }

    #[test]
    fn parse_number_rejects_garbage() {
        assert_eq!(parse_number::<u32>("RATE", " 24000 ").unwrap(), 24_000);
        assert!(matches!(
            parse_number::<u32>("RATE", "fast"),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn timeout_is_opt_in() {
        let mut generator = GeneratorConfig {
            backend: GeneratorBackend::Http,
            endpoint: "http://localhost:9000/generate".to_string(),
            health_url: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            timeout_secs: None,
        };
        assert_eq!(generator.timeout(), None);

        generator.timeout_secs = Some(30);
        assert_eq!(generator.timeout(), Some(Duration::from_secs(30)));
    }
}
