use alloy_primitives::{TxHash, U256};
use alloy_transport::TransportError;

/// EIP-1193 error code for a request the user declined.
pub const USER_REJECTED_REQUEST: i64 = 4001;

/// Errors raised by a [`WalletProvider`](crate::WalletProvider).
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Transport(TransportError),
    #[error("user rejected the request: {0}")]
    Rejected(String),
    #[error("{0} is not supported by this wallet provider")]
    Unsupported(&'static str),
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn other(msg: impl std::fmt::Display) -> Self {
        Self::Other(msg.to_string())
    }

    /// Whether the user declined the request in their wallet.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl From<TransportError> for ProviderError {
    fn from(err: TransportError) -> Self {
        match err.as_error_resp() {
            Some(payload) if payload.code == USER_REJECTED_REQUEST => {
                Self::Rejected(payload.message.to_string())
            }
            _ => Self::Transport(err),
        }
    }
}

/// Errors raised by the [`SessionManager`](crate::SessionManager).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no wallet provider detected")]
    NoProvider,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors raised by the [`ContractGateway`](crate::ContractGateway) and the live feed.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("contract gateway is offline: no wallet provider")]
    Offline,
    #[error("no account available to sign with")]
    NoSigner,
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("malformed contract response: {0}")]
    Decode(#[from] alloy_sol_types::Error),
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error(transparent)]
    InvalidTimestamp(#[from] InvalidTimestamp),
}

/// A raw wave timestamp that cannot be represented as a date-time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("wave timestamp {0} is out of range")]
pub struct InvalidTimestamp(pub U256);
