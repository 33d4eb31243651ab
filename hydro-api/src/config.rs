use hydro_store::db::LoadOptions;
use serde::Deserialize;
use std::{fs, path::PathBuf};

const CONFIG_ENV: &str = "HYDRO_API_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "hydro-api.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4010,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub csv_path: PathBuf,
    #[serde(flatten)]
    pub load: LoadOptions,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data/production.csv"),
            load: LoadOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    /// Read the TOML file named by `HYDRO_API_CONFIG` (default `hydro-api.toml`),
    /// then apply `CSV_PATH`, `HOST` and `PORT` from the environment.
    ///
    /// A missing default file means built-in defaults; a missing file that was
    /// named explicitly is an error.
    pub fn load() -> anyhow::Result<Self> {
        use anyhow::Context;
        use std::env;

        let mut cfg = match env::var(CONFIG_ENV) {
            Ok(path) => {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file {path}"))?;
                Self::from_toml_str(&contents).with_context(|| format!("invalid config file {path}"))?
            }
            Err(_) => match fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(contents) => Self::from_toml_str(&contents)
                    .with_context(|| format!("invalid config file {DEFAULT_CONFIG_PATH}"))?,
                Err(_) => Self::default(),
            },
        };

        cfg.apply_overrides(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = non_empty("CSV_PATH") {
            self.data.csv_path = PathBuf::from(path.trim());
        }
        if let Some(host) = non_empty("HOST") {
            self.server.host = host.trim().to_string();
        }
        if let Some(port) = non_empty("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid PORT '{port}': {e}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hydro_store::db::RowPolicy;
    use std::collections::HashMap;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.server.bind_addr(), "0.0.0.0:4010");
        assert_eq!(cfg.data.csv_path, PathBuf::from("data/production.csv"));
        assert_eq!(cfg.data.load.on_invalid_row, RowPolicy::Abort);
        assert_eq!(cfg.data.load.columns.site_id, "site_id");
        assert!(cfg.metrics.is_none());
    }

    #[test]
    fn parses_full_config() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [data]
            csv_path = "/srv/hpp.csv"
            on_invalid_row = "skip"
            default_unit = "MWh"

            [data.columns]
            site_id = "hpp_id"
            timestamp = "ts_utc"
            output_value = "E_prod_kWh"

            [[data.columns.losses]]
            value = "loss_value_1"
            validity = "loss_valid_id_1"

            [[data.columns.losses]]
            value = "loss_value_2"

            [metrics]
            bind_addr = "127.0.0.1:9100"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.bind_addr(), "127.0.0.1:8080");
        assert_eq!(cfg.data.csv_path, PathBuf::from("/srv/hpp.csv"));
        assert_eq!(cfg.data.load.on_invalid_row, RowPolicy::Skip);
        assert_eq!(cfg.data.load.default_unit, "MWh");
        assert_eq!(cfg.data.load.columns.site_id, "hpp_id");
        assert_eq!(cfg.data.load.columns.status, "status");
        let losses = &cfg.data.load.columns.losses;
        assert_eq!(losses.len(), 2);
        assert_eq!(losses[0].validity.as_deref(), Some("loss_valid_id_1"));
        assert_eq!(losses[1].value, "loss_value_2");
        assert!(losses[1].validity.is_none());
        assert_eq!(cfg.metrics.unwrap().bind_addr, "127.0.0.1:9100");
    }

    #[test]
    fn rejects_unknown_row_policy() {
        assert!(AppConfig::from_toml_str("[data]\non_invalid_row = \"ignore\"\n").is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> =
            HashMap::from([("CSV_PATH", "/tmp/x.csv"), ("PORT", "5000"), ("HOST", " ")]);
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(cfg.data.csv_path, PathBuf::from("/tmp/x.csv"));
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.host, "0.0.0.0");
    }

    #[test]
    fn invalid_port_override_fails() {
        let mut cfg = AppConfig::default();
        let err = cfg
            .apply_overrides(|k| (k == "PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
