#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ApiTimeout,
    ApiURL,
    ConfigFile,
    DataDir,
    SessionID,
}

pub struct Config {}

fn user_dir(base: Option<path::PathBuf>, file: &str) -> String {
    return base
        .unwrap_or_else(|| return path::PathBuf::from("."))
        .join("askimmigrate")
        .join(file)
        .to_string_lossy()
        .to_string();
}

impl Config {
    /// Directory of `debug.log`, overridable with `ASKIMMIGRATE_LOG_DIR`.
    pub fn log_dir() -> path::PathBuf {
        if let Ok(dir) = env::var("ASKIMMIGRATE_LOG_DIR") {
            if !dir.is_empty() {
                return path::PathBuf::from(dir);
            }
        }

        return dirs::cache_dir().unwrap_or_default().join("askimmigrate");
    }

    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let res = match key {
            ConfigKey::ApiTimeout => "10000".to_string(),
            ConfigKey::ApiURL => "http://localhost:9000".to_string(),
            ConfigKey::ConfigFile => user_dir(dirs::config_dir(), "config.toml"),
            ConfigKey::DataDir => user_dir(dirs::data_dir(), ""),
            ConfigKey::SessionID => "".to_string(),
        };

        return res.trim_end_matches(path::MAIN_SEPARATOR).to_string();
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            // Only global flags can be set from the file.
            for (name, _) in doc.iter() {
                let known = name != ConfigKey::ConfigFile.to_string()
                    && cmd
                        .get_arguments()
                        .any(|e| return e.get_long() == Some(name));
                if !known {
                    bail!(format!("config.toml has an unknown key '{name}'"));
                }
            }

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    if let Some(val_int) = val.as_integer() {
                        if val_int < 0 {
                            bail!(format!(
                                "config.toml has an invalid value for key '{key}': {val_int}"
                            ));
                        }
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        Config::set(key, val_str);
                    } else {
                        bail!(format!(
                            "config.toml has an invalid value for key '{key}', expected a string or a number"
                        ));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        if Config::get(ConfigKey::ApiTimeout).parse::<u64>().is_err() {
            bail!(format!(
                "{} must be a number of milliseconds, got '{}'",
                ConfigKey::ApiTimeout,
                Config::get(ConfigKey::ApiTimeout)
            ));
        }

        tracing::debug!(
            api_url = Config::get(ConfigKey::ApiURL),
            api_timeout = Config::get(ConfigKey::ApiTimeout),
            data_dir = Config::get(ConfigKey::DataDir),
            session_id = Config::get(ConfigKey::SessionID),
            "config"
        );

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

                let description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default()
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                let mut val = Config::default(key);
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
