//! Error types for the settlement service
//!
//! Every failure a wager can hit maps to one of these categories so the API
//! layer can hand back a machine-readable code without inspecting messages.

pub type StakehouseResult<T> = Result<T, StakehouseError>;

#[derive(Debug, thiserror::Error)]
pub enum StakehouseError {
    /// Malformed or out-of-range request parameter. Rejected before any
    /// state mutation.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Stake exceeds the player's balance. Rejected before the debit.
    #[error("insufficient funds: balance {balance_cents} cents, stake {stake_cents} cents")]
    InsufficientFunds {
        balance_cents: i64,
        stake_cents: i64,
    },

    /// Round lifecycle violation: reveal/cashout with no active round,
    /// duplicate reveal, cashout with nothing revealed.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// Referenced player (or other record) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Storage or another collaborator failed. Never masked as success and
    /// never paired with a partial credit.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}

impl StakehouseError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::StateConflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Stable machine-readable category for API envelopes and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::StateConflict(_) => "STATE_CONFLICT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unavailable(_) => "UPSTREAM_UNAVAILABLE",
        }
    }
}

impl From<rocksdb::Error> for StakehouseError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Unavailable(format!("rocksdb: {}", err))
    }
}

impl From<serde_json::Error> for StakehouseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Unavailable(format!("record encoding: {}", err))
    }
}

impl From<bincode::Error> for StakehouseError {
    fn from(err: bincode::Error) -> Self {
        Self::Unavailable(format!("round state encoding: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(StakehouseError::validation("x").code(), "VALIDATION");
        assert_eq!(
            StakehouseError::InsufficientFunds {
                balance_cents: 10,
                stake_cents: 100
            }
            .code(),
            "INSUFFICIENT_FUNDS"
        );
        assert_eq!(StakehouseError::conflict("x").code(), "STATE_CONFLICT");
        assert_eq!(StakehouseError::not_found("x").code(), "NOT_FOUND");
        assert_eq!(
            StakehouseError::unavailable("x").code(),
            "UPSTREAM_UNAVAILABLE"
        );
    }

    #[test]
    fn insufficient_funds_message_carries_amounts() {
        let err = StakehouseError::InsufficientFunds {
            balance_cents: 150,
            stake_cents: 500,
        };
        let msg = err.to_string();
        assert!(msg.contains("150"));
        assert!(msg.contains("500"));
    }
}
