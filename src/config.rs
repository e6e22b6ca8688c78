use std::{env, net::SocketAddr, time::Duration};

use tracing::warn;

use crate::{
    model::Pacing,
    types::{SafetyLevel, SafetySettings},
};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_bind: SocketAddr,
    pub init_delay_ms: u64,
    pub processing_delay_ms: u64,
    pub chunk_delay_ms: u64,
    pub simulate_init_failure: bool,
    pub safety_level: SafetyLevel,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_owned());
        let http_bind = env::var("HTTP_BIND").unwrap_or_else(|_| format!("0.0.0.0:{port}"));
        let http_bind = http_bind.parse()?;

        Ok(Self {
            http_bind,
            init_delay_ms: env_u64("INIT_DELAY_MS", 300),
            processing_delay_ms: env_u64("PROCESSING_DELAY_MS", 500),
            chunk_delay_ms: env_u64("CHUNK_DELAY_MS", 50),
            simulate_init_failure: env_bool("SIMULATE_INIT_FAILURE", false),
            safety_level: env_safety_level("SAFETY_LEVEL"),
        })
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            init_delay: Duration::from_millis(self.init_delay_ms),
            processing_delay: Duration::from_millis(self.processing_delay_ms),
            chunk_delay: Duration::from_millis(self.chunk_delay_ms),
        }
    }

    pub fn safety_settings(&self) -> SafetySettings {
        SafetySettings {
            level: self.safety_level,
            ..SafetySettings::default()
        }
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|raw| parse_bool(&raw))
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_safety_level(name: &str) -> SafetyLevel {
    let Ok(raw) = env::var(name) else {
        return SafetyLevel::default();
    };
    SafetyLevel::parse(&raw).unwrap_or_else(|| {
        warn!(value = %raw, "unknown {name}; valid values are strict|moderate|permissive");
        SafetyLevel::default()
    })
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::types::SafetyLevel;

    use super::{AppConfig, parse_bool};

    #[test]
    fn parses_truthy_values() {
        for raw in ["1", "true", " YES ", "On"] {
            assert!(parse_bool(raw), "{raw:?} should be truthy");
        }
        for raw in ["0", "false", "", "maybe"] {
            assert!(!parse_bool(raw), "{raw:?} should be falsy");
        }
    }

    #[test]
    fn pacing_and_settings_follow_config() {
        let config = AppConfig {
            http_bind: "127.0.0.1:0".parse().expect("address should parse"),
            init_delay_ms: 1,
            processing_delay_ms: 2,
            chunk_delay_ms: 3,
            simulate_init_failure: false,
            safety_level: SafetyLevel::Moderate,
        };

        let pacing = config.pacing();
        assert_eq!(pacing.init_delay, Duration::from_millis(1));
        assert_eq!(pacing.processing_delay, Duration::from_millis(2));
        assert_eq!(pacing.chunk_delay, Duration::from_millis(3));

        let settings = config.safety_settings();
        assert_eq!(settings.level, SafetyLevel::Moderate);
        assert!(settings.block_harassment);
    }
}
