use alloy_primitives::Address;
use clap::Parser;
use serde::Serialize;
use wave_config::{
    ExtractConfigError, WaveConfig,
    figment::{
        self, Figment, Metadata, Profile,
        value::{Dict, Map, Value},
    },
};

/// Where to find the wallet and the contract.
#[derive(Clone, Debug, Default, Serialize, Parser)]
#[command(next_help_heading = "Portal options")]
pub struct PortalOpts {
    /// The wallet provider endpoint. `ws://` and `wss://` endpoints stream new waves, `http://`
    /// endpoints poll for them.
    #[arg(short = 'r', long = "rpc-url", env = "ETH_RPC_URL", value_name = "URL", global = true)]
    #[serde(rename = "eth_rpc_url", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// The address of the WavePortal contract.
    #[arg(long, value_name = "ADDRESS", global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<Address>,

    /// Gas limit for `wave` transactions.
    #[arg(long, value_name = "GAS", global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
}

impl figment::Provider for PortalOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("PortalOpts")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Ok(Map::from([(WaveConfig::selected_profile(), self.dict())]))
    }
}

impl PortalOpts {
    pub fn dict(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(url) = &self.url {
            dict.insert("eth_rpc_url".into(), url.clone().into());
        }
        if let Some(contract) = self.contract {
            dict.insert("contract".into(), Value::from(contract.to_string()));
        }
        if let Some(gas_limit) = self.gas_limit {
            dict.insert("gas_limit".into(), gas_limit.into());
        }
        dict
    }

    /// The config figment with these options merged on top.
    pub fn figment(&self) -> Figment {
        WaveConfig::figment().merge(self.clone())
    }

    /// Resolves the config, with these options taking precedence over files and environment.
    pub fn load_config(&self) -> Result<WaveConfig, ExtractConfigError> {
        WaveConfig::try_from(self.figment())
    }
}
