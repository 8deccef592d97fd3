//! # wave-config
//!
//! Configuration for the WavePortal client.
//!
//! Values are resolved with [`figment`], lowest precedence first:
//!
//! 1. [`WaveConfig::default`]
//! 2. `wave.toml` (or the file named by `WAVE_CONFIG`), `[profile.<name>]` tables
//! 3. `ETH_RPC_URL`
//! 4. `WAVE_*` environment variables
//! 5. whatever the caller merges on top, e.g. CLI options
//!
//! A named profile selected with `WAVE_PROFILE` inherits every key it does not set from
//! `[profile.default]`.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

use alloy_primitives::{Address, address};
use figment::{
    Figment, Metadata, Profile, Provider,
    providers::{Env, Serialized},
    value::{Dict, Map},
};
use serde::{Deserialize, Serialize};

mod error;
pub use error::{ExtractConfigError, FAILED_TO_EXTRACT_CONFIG_MSG};

mod providers;
use providers::{TomlFileProvider, UnwrapProfileProvider};

pub use figment;

/// WavePortal client configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// The selected profile. Set from the extracting figment, never serialized.
    #[serde(skip)]
    pub profile: Profile,
    /// Endpoint of the wallet provider. `None` runs the client without a wallet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eth_rpc_url: Option<String>,
    /// Address of the deployed WavePortal contract.
    pub contract: Address,
    /// Gas ceiling attached to every `wave` transaction.
    pub gas_limit: u64,
}

impl WaveConfig {
    /// The default profile: "default"
    pub const DEFAULT_PROFILE: Profile = Profile::const_new("default");

    /// File name of the project config.
    pub const FILE_NAME: &'static str = "wave.toml";

    /// Environment variable prefix for config keys.
    pub const ENV_PREFIX: &'static str = "WAVE_";

    /// The deployed WavePortal contract.
    ///
    /// `0x1507178BeeA21cA6F9BB071140d7dF545FdB852C`
    pub const DEFAULT_CONTRACT: Address = address!("1507178BeeA21cA6F9BB071140d7dF545FdB852C");

    /// Gas ceiling used for `wave` transactions unless configured otherwise.
    pub const DEFAULT_GAS_LIMIT: u64 = 300_000;

    /// Returns the config resolved from the default [`figment`](Self::figment).
    pub fn load() -> Result<Self, ExtractConfigError> {
        Self::try_from(Self::figment())
    }

    /// Attempts to extract a `WaveConfig` from `provider`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use wave_config::{WaveConfig, figment::providers::{Format, Toml}};
    ///
    /// let figment = WaveConfig::figment().merge(Toml::file("other.toml").nested());
    /// let config = WaveConfig::try_from(figment).unwrap();
    /// ```
    pub fn try_from<T: Provider>(provider: T) -> Result<Self, ExtractConfigError> {
        let figment = Figment::from(provider);
        trace!("load config with provider: {:?}", figment.metadata().collect::<Vec<_>>());
        let mut config = figment.extract::<Self>().map_err(ExtractConfigError::new)?;
        config.profile = figment.profile().clone();
        Ok(config)
    }

    /// Returns the default figment: defaults, config file and environment.
    pub fn figment() -> Figment {
        Self::default().into()
    }

    /// Returns the profile selected by `WAVE_PROFILE`, falling back to "default".
    pub fn selected_profile() -> Profile {
        Profile::from_env_or("WAVE_PROFILE", Self::DEFAULT_PROFILE)
    }

    /// Returns the wallet provider endpoint, if one is configured.
    ///
    /// Blank values count as unset.
    pub fn rpc_url(&self) -> Option<&str> {
        self.eth_rpc_url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }

    fn to_figment(&self) -> Figment {
        let profile = Self::selected_profile();
        let file = UnwrapProfileProvider::new(
            TomlFileProvider::new("WAVE_CONFIG", Self::FILE_NAME),
            "profile",
        );
        let eth_rpc_url = Env::raw().only(&["ETH_RPC_URL"]).map(|_| "eth_rpc_url".into());
        let env = Env::prefixed(Self::ENV_PREFIX).ignore(&["PROFILE", "CONFIG", "DEBUG"]);

        Figment::from(self.clone())
            .merge(file)
            .merge(eth_rpc_url.global())
            .merge(env.global())
            .select(profile)
    }
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            profile: Self::DEFAULT_PROFILE,
            eth_rpc_url: None,
            contract: Self::DEFAULT_CONTRACT,
            gas_limit: Self::DEFAULT_GAS_LIMIT,
        }
    }
}

impl From<WaveConfig> for Figment {
    fn from(config: WaveConfig) -> Self {
        config.to_figment()
    }
}

impl Provider for WaveConfig {
    fn metadata(&self) -> Metadata {
        Metadata::named("WaveConfig")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let dict = Serialized::defaults(self).data()?.remove(&Profile::Default).unwrap_or_default();
        Ok(Map::from([(self.profile.clone(), dict)]))
    }

    fn profile(&self) -> Option<Profile> {
        Some(self.profile.clone())
    }
}
