//! Custom figment providers.

use figment::{
    Error, Metadata, Profile, Provider,
    providers::{Env, Format, Toml},
    value::{Dict, Map, Value},
};
use std::path::{Path, PathBuf};

/// Reads the project toml file.
///
/// Errors if `env_var` names a file that does not exist, a missing default file is fine.
pub(crate) struct TomlFileProvider {
    pub env_var: &'static str,
    pub default: PathBuf,
}

impl TomlFileProvider {
    pub(crate) fn new(env_var: &'static str, default: impl Into<PathBuf>) -> Self {
        Self { env_var, default: default.into() }
    }

    fn env_val(&self) -> Option<String> {
        Env::var(self.env_var)
    }

    fn file(&self) -> PathBuf {
        self.env_val().map(PathBuf::from).unwrap_or_else(|| self.default.clone())
    }
}

impl Provider for TomlFileProvider {
    fn metadata(&self) -> Metadata {
        Toml::file(self.file()).nested().metadata()
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        use serde::de::Error as _;
        if let Some(file) = self.env_val()
            && !Path::new(&file).exists()
        {
            return Err(Error::custom(format!(
                "Config file `{file}` set in env var `{}` does not exist",
                self.env_var
            )));
        }
        Toml::file(self.file()).nested().data()
    }
}

/// Lifts `[profile.<name>]` tables of the wrapped provider into figment profiles.
pub(crate) struct UnwrapProfileProvider<P> {
    provider: P,
    wrapping_key: Profile,
}

impl<P> UnwrapProfileProvider<P> {
    pub(crate) fn new(provider: P, wrapping_key: impl Into<Profile>) -> Self {
        Self { provider, wrapping_key: wrapping_key.into() }
    }
}

impl<P: Provider> Provider for UnwrapProfileProvider<P> {
    fn metadata(&self) -> Metadata {
        self.provider.metadata()
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        use serde::de::Error as _;
        let mut data = self.provider.data()?;
        let Some(wrapped) = data.remove(&self.wrapping_key) else {
            return Ok(data);
        };

        let mut profiles = Map::new();
        for (name, value) in wrapped {
            match value {
                Value::Dict(_, dict) => {
                    profiles.insert(Profile::new(&name), dict);
                }
                _ => {
                    return Err(Error::custom(format!(
                        "`{}.{name}` must be a table",
                        self.wrapping_key
                    )));
                }
            }
        }
        Ok(profiles)
    }
}
