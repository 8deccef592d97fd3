//! Wallet session management.

use crate::{error::SessionError, provider::SharedProvider};
use alloy_primitives::Address;
use parking_lot::RwLock;
use std::sync::Arc;

/// The connection state of the page: which account, if any, is connected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub account: Option<Address>,
}

impl Session {
    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }
}

/// Shared handle to the [`Session`].
pub type SessionHandle = Arc<RwLock<Session>>;

/// Detects the wallet provider and tracks the connected account.
#[derive(Clone, Debug)]
pub struct SessionManager {
    provider: Option<SharedProvider>,
    session: SessionHandle,
}

impl SessionManager {
    pub fn new(provider: Option<SharedProvider>) -> Self {
        Self { provider, session: Default::default() }
    }

    /// Whether a wallet provider is present.
    pub fn detect_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn provider(&self) -> Option<&SharedProvider> {
        self.provider.as_ref()
    }

    /// Returns the current session state.
    pub fn session(&self) -> Session {
        *self.session.read()
    }

    /// Returns a handle that observes the session as it changes.
    pub fn handle(&self) -> SessionHandle {
        self.session.clone()
    }

    pub fn account(&self) -> Option<Address> {
        self.session.read().account
    }

    /// Looks up an account the user already authorized, without prompting.
    ///
    /// Updates the session with the first authorized account, or clears it when there is none.
    pub async fn get_authorized_account(&self) -> Result<Option<Address>, SessionError> {
        let provider = self.provider.as_ref().ok_or(SessionError::NoProvider)?;
        let account = provider.accounts().await?.first().copied();
        match account {
            Some(account) => debug!(%account, "found an authorized account"),
            None => debug!("no authorized account found"),
        }
        self.session.write().account = account;
        Ok(account)
    }

    /// Prompts the user to connect their wallet.
    ///
    /// On approval the session switches to the first granted account. A rejected prompt leaves
    /// the session untouched.
    pub async fn request_connection(&self) -> Result<Option<Address>, SessionError> {
        let provider = self.provider.as_ref().ok_or(SessionError::NoProvider)?;
        let account = provider.request_accounts().await?.first().copied();
        if let Some(account) = account {
            debug!(%account, "connected");
            self.session.write().account = Some(account);
        }
        Ok(account)
    }
}
