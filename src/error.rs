use thiserror::Error;

#[derive(Error, Debug)]
pub enum EarnError {
    #[error("Request to {endpoint} failed{}: {body}", status_suffix(.status))]
    Transport {
        endpoint: String,
        status: Option<u16>,
        body: String,
    },

    #[error("Invalid response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Circuit breaker open for {endpoint}")]
    CircuitOpen { endpoint: String },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Partner config for '{partner_id}' unavailable: {reason}")]
    PartnerConfig { partner_id: String, reason: String },

    #[error("Container with ID \"{0}\" not found")]
    ContainerNotFound(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" with status {}", code))
        .unwrap_or_default()
}

impl EarnError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            EarnError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            EarnError::Transport { endpoint, .. }
            | EarnError::Decode { endpoint, .. }
            | EarnError::CircuitOpen { endpoint } => Some(endpoint),
            _ => None,
        }
    }

    /// Transport-class failures are the ones surfaced to callers of the client.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            EarnError::Transport { .. } | EarnError::Decode { .. } | EarnError::CircuitOpen { .. }
        )
    }
}

pub type EarnResult<T> = Result<T, EarnError>;
