use std::fmt;

/// Failures a [`crate::ChainGateway`] may report.
///
/// Adapters translate provider-specific failures into these variants at the
/// boundary (see [`GatewayError::from_eip1193`]). Message strings are carried
/// for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The wallet owner declined to sign.
    UserRejected,
    /// Not enough native balance to pay for gas.
    InsufficientGas,
    /// Transport failure, disconnected provider, or invalidated gateway.
    Network(String),
    /// The contract call itself failed (bad address, view reverted, ...).
    Contract(String),
    /// Waiting for the chain exceeded the allotted time.
    ///
    /// The transaction may still land; resubmitting risks paying twice.
    Timeout,
}

impl GatewayError {
    /// Stable code for logs and presentation-layer message lookup.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserRejected => "GATEWAY_USER_REJECTED",
            Self::InsufficientGas => "GATEWAY_INSUFFICIENT_GAS",
            Self::Network(_) => "GATEWAY_NETWORK",
            Self::Contract(_) => "GATEWAY_CONTRACT",
            Self::Timeout => "GATEWAY_TIMEOUT",
        }
    }

    /// Safe for the caller to try the same operation again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UserRejected | Self::InsufficientGas | Self::Network(_)
        )
    }

    /// Map an EIP-1193 / EIP-1474 provider error code.
    ///
    /// `-32000` is the node's generic "invalid input" code; it becomes
    /// `InsufficientGas` only when the node reports insufficient funds.
    /// This is the one place a provider message is inspected. Unknown codes
    /// are treated as transport failures.
    pub fn from_eip1193(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        match code {
            4001 => Self::UserRejected,
            4100 | 4200 | 4900 | 4901 => Self::Network(message),
            // execution reverted / VM execution error
            3 | -32015 => Self::Contract(message),
            -32000 if is_insufficient_funds(&message) => Self::InsufficientGas,
            _ => Self::Network(message),
        }
    }
}

fn is_insufficient_funds(message: &str) -> bool {
    message.to_ascii_lowercase().contains("insufficient funds")
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserRejected => write!(f, "{}: transaction rejected by user", self.code()),
            Self::InsufficientGas => write!(f, "{}: insufficient funds for gas", self.code()),
            Self::Network(msg) => write!(f, "{}: {msg}", self.code()),
            Self::Contract(msg) => write!(f, "{}: {msg}", self.code()),
            Self::Timeout => write!(f, "{}: timed out waiting for the chain", self.code()),
        }
    }
}

impl std::error::Error for GatewayError {}
