//! Recoverable error taxonomy. Out-of-bounds grid access is deliberately
//! absent here — it panics (see `Grid::at`), the only sanctioned response
//! per the core's error-handling design.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhysicsError {
    #[error("unknown tunable: {0}")]
    UnknownTunable(String),

    #[error("invalid value for tunable {name}: {value}")]
    InvalidTunableValue { name: String, value: f64 },

    #[error("failed to deserialize snapshot: {0}")]
    SnapshotDecode(String),

    #[error("failed to serialize snapshot: {0}")]
    SnapshotEncode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_carry_readable_messages() {
        let err = PhysicsError::UnknownTunable("not_a_real_tunable".to_string());
        assert!(err.to_string().contains("not_a_real_tunable"));
    }
}
