//! Error reporting for the `wave` binary.
//!
//! Errors are printed as their top message, one `caused by:` line per distinct source, and a
//! hint when the chain contains a failure the user can act on, such as a bad `wave.toml` or a
//! missing wallet provider.

use eyre::EyreHandler;
use itertools::Itertools;
use std::{error::Error, fmt};
use wave_config::ExtractConfigError;
use wave_portal::{GatewayError, ProviderError, SessionError};

/// Set to report errors with color-eyre's verbose handler instead.
pub const DEBUG_ENV: &str = "WAVE_DEBUG";

const CONFIG_HINT: &str = "check wave.toml, or the file named by WAVE_CONFIG";
const NO_PROVIDER_HINT: &str = "set `eth_rpc_url` in wave.toml, ETH_RPC_URL, or pass --rpc-url";
const NO_ACCOUNT_HINT: &str = "run `wave connect` first to authorize an account";
const REJECTED_HINT: &str = "the request was declined in the wallet";
const UNREACHABLE_HINT: &str = "the wallet provider did not answer, is the node running?";

/// The `eyre` handler installed by [`install`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Handler;

impl EyreHandler for Handler {
    fn display(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Display;
        causes(error).iter().map(|cause| cause.lines().map(str::trim).join(" ")).format("; ").fmt(f)
    }

    fn debug(&self, error: &(dyn Error + 'static), f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return fmt::Debug::fmt(error, f);
        }
        let causes = causes(error);
        for (i, cause) in causes.iter().enumerate() {
            let mut lines = cause.lines();
            if let Some(first) = lines.next() {
                if i == 0 {
                    write!(f, "{first}")?;
                } else {
                    write!(f, "\n  caused by: {first}")?;
                }
            }
            // multi-line messages, e.g. config extraction errors, keep their own lines
            for line in lines.map(str::trim).filter(|line| !line.is_empty()) {
                write!(f, "\n    {line}")?;
            }
        }
        if let Some(hint) = hint(error) {
            write!(f, "\n\nhint: {hint}")?;
        }
        Ok(())
    }
}

/// The messages of `error` and its sources. A message already contained in the one before it
/// is dropped, so `msg1: msg2; msg2` reads `msg1: msg2`.
pub fn causes(error: &(dyn Error + 'static)) -> Vec<String> {
    let mut causes = eyre::Chain::new(error)
        .map(|cause| cause.to_string().trim().to_string())
        .collect::<Vec<_>>();
    causes.dedup_by(|b, a| a.contains(b.as_str()));
    causes
}

/// A suggestion for the first error in the chain the user can do something about.
pub fn hint(error: &(dyn Error + 'static)) -> Option<&'static str> {
    eyre::Chain::new(error).find_map(|cause| {
        if cause.is::<ExtractConfigError>() {
            return Some(CONFIG_HINT);
        }
        match cause.downcast_ref::<GatewayError>() {
            Some(GatewayError::Offline) => return Some(NO_PROVIDER_HINT),
            Some(GatewayError::NoSigner) => return Some(NO_ACCOUNT_HINT),
            _ => {}
        }
        if let Some(SessionError::NoProvider) = cause.downcast_ref::<SessionError>() {
            return Some(NO_PROVIDER_HINT);
        }
        match cause.downcast_ref::<ProviderError>()? {
            ProviderError::Rejected(_) => Some(REJECTED_HINT),
            ProviderError::Transport(_) => Some(UNREACHABLE_HINT),
            _ => None,
        }
    })
}

/// Installs the [`eyre`] and [`panic`](mod@std::panic) hooks.
///
/// Panics always go through color-eyre. Errors use [`Handler`] unless [`DEBUG_ENV`] is set.
pub fn install() {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section("This is a bug in the wave client. Consider reporting it.")
        .display_env_section(false)
        .into_hooks();
    panic_hook.install();

    let verbose = std::env::var_os(DEBUG_ENV).is_some();
    let eyre_hook = eyre_hook.into_eyre_hook();
    let installed = eyre::set_hook(Box::new(move |error| {
        let handler: Box<dyn EyreHandler> = if verbose { eyre_hook(error) } else { Box::new(Handler) };
        handler
    }));
    if let Err(err) = installed {
        debug!(%err, "eyre hook already installed");
    }
}
