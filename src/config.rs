//! Runtime settings read from the environment

use tracing::warn;

pub const DEFAULT_DB_PATH: &str = "./data/authz.mdb";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Settings for the membership store and the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Settings {
    /// `INVENTACK_AUTHZ_DB`
    pub db_path: String,
    /// `INVENTACK_AUTHZ_MAP_SIZE`, LMDB map size in bytes
    pub map_size: usize,
    /// `PORT`
    pub port: u16,
    /// `RUST_LOG`
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.into(),
            map_size: DEFAULT_MAP_SIZE,
            port: DEFAULT_PORT,
            log_filter: DEFAULT_LOG_FILTER.into(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build settings from any key lookup. Unparseable numbers keep their default.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let d = Self::default();
        Self {
            db_path: lookup("INVENTACK_AUTHZ_DB").unwrap_or(d.db_path),
            map_size: parse_or("INVENTACK_AUTHZ_MAP_SIZE", lookup("INVENTACK_AUTHZ_MAP_SIZE"), d.map_size),
            port: parse_or("PORT", lookup("PORT"), d.port),
            log_filter: lookup("RUST_LOG").unwrap_or(d.log_filter),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(s) => s.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %s, %default, "invalid setting, using default");
            default
        }),
    }
}
