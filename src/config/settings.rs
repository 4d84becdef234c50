// src/config/settings.rs

use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_STORAGE_DIR: &str = "storage/public";
const DEFAULT_STORAGE_URL: &str = "/storage";
const DEFAULT_MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub storage_dir: PathBuf,
    pub storage_url: String,
    pub max_logo_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de busca (o ambiente, nos testes um mapa).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{key} deve ser definida"))
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse().context("DB_MAX_CONNECTIONS deve ser um inteiro")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let max_logo_bytes = match lookup("MAX_LOGO_BYTES") {
            Some(v) => v.parse().context("MAX_LOGO_BYTES deve ser um inteiro")?,
            None => DEFAULT_MAX_LOGO_BYTES,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_max_connections,
            storage_dir: lookup("STORAGE_DIR")
                .unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_string())
                .into(),
            storage_url: lookup("STORAGE_URL").unwrap_or_else(|| DEFAULT_STORAGE_URL.to_string()),
            max_logo_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn fills_defaults_for_optional_keys() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/backoffice"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert_eq!(settings.db_max_connections, 5);
        assert_eq!(settings.storage_dir, PathBuf::from("storage/public"));
        assert_eq!(settings.storage_url, "/storage");
        assert_eq!(settings.max_logo_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/x")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn non_numeric_pool_size_is_an_error() {
        let result = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/x"),
            ("JWT_SECRET", "s"),
            ("DB_MAX_CONNECTIONS", "muitas"),
        ]));
        assert!(result.is_err());
    }
}
