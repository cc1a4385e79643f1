use crate::foundation::core::Algorithm;

pub type ReplayResult<T> = Result<T, ReplayError>;

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error("not found: no {algorithm} trajectory for house '{house}'")]
    NotFound { house: String, algorithm: Algorithm },

    #[error("invalid trajectory: {0}")]
    InvalidTrajectory(String),

    #[error("precondition violation: {0}")]
    PreconditionViolation(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("io error: {0}")]
    Io(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReplayError {
    pub fn not_found(house: impl Into<String>, algorithm: Algorithm) -> Self {
        Self::NotFound {
            house: house.into(),
            algorithm,
        }
    }

    pub fn invalid_trajectory(msg: impl Into<String>) -> Self {
        Self::InvalidTrajectory(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::PreconditionViolation(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// `NotFound` is the only kind a caller may skip past; everything else is a bug in the
    /// input or in the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            ReplayError::not_found("h1", Algorithm::Dfs)
                .to_string()
                .contains("not found:")
        );
        assert!(
            ReplayError::invalid_trajectory("x")
                .to_string()
                .contains("invalid trajectory:")
        );
        assert!(
            ReplayError::precondition("x")
                .to_string()
                .contains("precondition violation:")
        );
        assert!(
            ReplayError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            ReplayError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
        assert!(ReplayError::io("x").to_string().contains("io error:"));
    }

    #[test]
    fn not_found_names_house_and_algorithm() {
        let msg = ReplayError::not_found("house_3", Algorithm::Spiral).to_string();
        assert!(msg.contains("house_3"));
        assert!(msg.contains("SpiralCleaningAlgorithm"));
    }

    #[test]
    fn only_not_found_is_recoverable() {
        assert!(ReplayError::not_found("h", Algorithm::Dfs).is_recoverable());
        assert!(!ReplayError::invalid_trajectory("x").is_recoverable());
        assert!(!ReplayError::precondition("x").is_recoverable());
        assert!(!ReplayError::validation("x").is_recoverable());
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = ReplayError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
