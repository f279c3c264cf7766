use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File, Map};
use serde_derive::Deserialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// JSON document preloaded into the store at startup.
    pub seed: Option<PathBuf>,
}

impl Settings {
    /// Reads `settings` (any format `config` understands, optional), then
    /// `EVENT_GRAPH_*` environment variables on top of it.
    pub fn load(path: &str) -> Result<Settings, ConfigError> {
        Settings::from_environment(path, None)
    }

    /// Like `load`, reading variables from `variables` instead of the process
    /// environment when given.
    fn from_environment(
        path: &str,
        variables: Option<Map<String, String>>,
    ) -> Result<Settings, ConfigError> {
        Settings::file_layer(path)?
            .add_source(
                Environment::with_prefix("EVENT_GRAPH")
                    .try_parsing(true)
                    .source(variables),
            )
            .build()?
            .try_deserialize()
    }

    fn file_layer(path: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 4000)?
            .add_source(File::with_name(path).required(false)))
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_settings_file() {
        let settings = Settings::from_environment("does-not-exist/settings", Some(Map::new()))
            .unwrap();
        assert_eq!(settings.port, 4000);
        assert_eq!(settings.address(), "127.0.0.1:4000");
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn environment_overrides_defaults() {
        let mut variables = Map::new();
        variables.insert("EVENT_GRAPH_PORT".to_owned(), "8080".to_owned());
        variables.insert("EVENT_GRAPH_HOST".to_owned(), "0.0.0.0".to_owned());
        let settings =
            Settings::from_environment("does-not-exist/settings", Some(variables)).unwrap();
        assert_eq!(settings.address(), "0.0.0.0:8080");
    }
}
