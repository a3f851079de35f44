#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use crate::domain::models::BackendName;
use crate::domain::models::ResponderName;

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    Backend,
    BackendHealthCheckTimeout,
    ConfigFile,
    DataDir,
    EsmfoldURL,
    GeminiToken,
    GeminiURL,
    Model,
    OllamaURL,
    OpenAiToken,
    OpenAiURL,
    PubchemURL,
    RcsbFilesURL,
    RcsbSearchURL,
    Responder,
    SessionID,
    WorkflowURL,
}

/// Layered key/value configuration. Values resolve as defaults, then the
/// TOML config file, then CLI arguments and environment variables.
#[derive(Clone, Default)]
pub struct Config {
    values: DashMap<String, String>,
}

impl Config {
    pub fn with_defaults() -> Config {
        let config = Config::default();
        for key in ConfigKey::iter() {
            config.set(key, &Config::default_value(key));
        }

        return config;
    }

    pub fn get(&self, key: ConfigKey) -> String {
        if let Some(val) = self.values.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(&self, key: ConfigKey, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn default_value(key: ConfigKey) -> String {
        let default_backend = BackendName::None.to_string();
        let default_responder = ResponderName::Assistant.to_string();

        let config_path = dirs::config_dir()
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join("biocopilot/config.toml");
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join("biocopilot");

        let res = match key {
            ConfigKey::Backend => default_backend,
            ConfigKey::BackendHealthCheckTimeout => "1000".to_string(),
            ConfigKey::EsmfoldURL => "https://api.esmatlas.com".to_string(),
            ConfigKey::GeminiToken => "".to_string(),
            ConfigKey::GeminiURL => "https://generativelanguage.googleapis.com".to_string(),
            ConfigKey::Model => "".to_string(),
            ConfigKey::OllamaURL => "http://localhost:11434".to_string(),
            ConfigKey::OpenAiToken => "".to_string(),
            ConfigKey::OpenAiURL => "https://api.openai.com".to_string(),
            ConfigKey::PubchemURL => "https://pubchem.ncbi.nlm.nih.gov/rest/pug".to_string(),
            ConfigKey::RcsbFilesURL => "https://files.rcsb.org".to_string(),
            ConfigKey::RcsbSearchURL => "https://search.rcsb.org".to_string(),
            ConfigKey::Responder => default_responder,
            ConfigKey::WorkflowURL => "".to_string(),

            // Special
            ConfigKey::ConfigFile => config_path.to_string_lossy().to_string(),
            ConfigKey::DataDir => data_dir.to_string_lossy().to_string(),
            ConfigKey::SessionID => "".to_string(),
        };

        return res;
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<Config> {
        let config = Config::with_defaults();

        let mut config_file = Config::default_value(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = tokio::fs::read_to_string(config_path).await?;
            config.apply_toml(&cmd, &toml_str)?;
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    config.set(key, val)
                }
            }
        }

        tracing::debug!(
            backend = config.get(ConfigKey::Backend),
            model = config.get(ConfigKey::Model),
            responder = config.get(ConfigKey::Responder),
            data_dir = config.get(ConfigKey::DataDir),
            "config"
        );

        return Ok(config);
    }

    fn apply_toml(&self, cmd: &Command, toml_str: &str) -> Result<()> {
        let doc = toml_str.parse::<toml_edit::Document>()?;

        for key in ConfigKey::iter() {
            if let Some(val) = doc.get(&key.to_string()) {
                // Use clap value parsers to do validation.
                let mut possible_values = vec![];
                if let Some(arg) = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                {
                    possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name().to_string())
                        .collect::<Vec<String>>();
                }

                if let Some(val_int) = val.as_integer() {
                    self.set(key, &val_int.to_string());
                } else if let Some(val_str) = val.as_str() {
                    if val_str.is_empty() {
                        continue;
                    }
                    if !possible_values.is_empty()
                        && !possible_values.contains(&val_str.to_string())
                    {
                        bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                    }
                    self.set(key, val_str);
                }
            }
        }

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::SessionID || key == ConfigKey::ConfigFile {
                    return None;
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let mut description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default();

                description = description
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name().to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default_value(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i32>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
