// src/config.rs
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

use crate::db::parcels::is_sql_identifier;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Knobs of the analytic operations themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// `record_code` value marking the primary row of a PIN.
    pub primary_record_code: String,
    pub residential_tax_class_prefix: String,
    pub subdivision_tax_class_prefix: String,
    pub subdivision_min_parcels: i64,
    pub neighbor_limit_max: usize,
    pub owner_search_limit: usize,
    pub radius_comp_limit: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            primary_record_code: "1".to_string(),
            residential_tax_class_prefix: "1".to_string(),
            subdivision_tax_class_prefix: "1".to_string(),
            subdivision_min_parcels: 20,
            neighbor_limit_max: 500,
            owner_search_limit: 200,
            radius_comp_limit: 50,
        }
    }
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub table: String,
    pub bind_addr: SocketAddr,
    pub max_workers: usize,
    pub session_cookie: String,
    pub analytics: AnalyticsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: "parcels.sqlite3".to_string(),
            table: "parcels".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_workers: 8,
            session_cookie: "session".to_string(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Environment (after an optional `.env`) over defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = AppConfig::default();
        let text = |key: &str, slot: &mut String| {
            if let Some(v) = get(key).filter(|v| !v.trim().is_empty()) {
                *slot = v.trim().to_string();
            }
        };

        text("PARCELS_DB_PATH", &mut cfg.db_path);
        text("PARCELS_TABLE", &mut cfg.table);
        text("SESSION_COOKIE", &mut cfg.session_cookie);
        text("PRIMARY_RECORD_CODE", &mut cfg.analytics.primary_record_code);
        text(
            "RESIDENTIAL_TAX_CLASS_PREFIX",
            &mut cfg.analytics.residential_tax_class_prefix,
        );
        text(
            "SUBDIVISION_TAX_CLASS_PREFIX",
            &mut cfg.analytics.subdivision_tax_class_prefix,
        );

        if !is_sql_identifier(&cfg.table) {
            return Err(ConfigError::Invalid {
                key: "PARCELS_TABLE",
                value: cfg.table,
                reason: "must be a plain SQL identifier".into(),
            });
        }

        parse_into(&get, "BIND_ADDR", &mut cfg.bind_addr)?;
        parse_into(&get, "MAX_WORKERS", &mut cfg.max_workers)?;
        parse_into(
            &get,
            "SUBDIVISION_MIN_PARCELS",
            &mut cfg.analytics.subdivision_min_parcels,
        )?;
        parse_into(&get, "NEIGHBOR_LIMIT_MAX", &mut cfg.analytics.neighbor_limit_max)?;
        parse_into(&get, "OWNER_SEARCH_LIMIT", &mut cfg.analytics.owner_search_limit)?;
        parse_into(&get, "RADIUS_COMP_LIMIT", &mut cfg.analytics.radius_comp_limit)?;

        if cfg.max_workers == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_WORKERS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(cfg)
    }
}

fn parse_into<F, T>(get: &F, key: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = get(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(());
    };
    *slot = raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.clone(),
        reason: e.to_string(),
    })?;
    Ok(())
}
