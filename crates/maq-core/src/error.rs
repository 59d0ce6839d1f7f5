//! Core error taxonomy.
//!
//! Codec failures are values, never panics: a scene that fails to load
//! leaves the surface in its prior valid state. Invariant violations on
//! in-process data (duplicate ids, non-positive canvas) are programming
//! errors and fail fast in `model` instead of appearing here.

/// A persisted scene payload that cannot be restored.
#[derive(Debug, thiserror::Error)]
pub enum MalformedSceneError {
    /// Payload is not parseable, or names an unsupported node variant.
    #[error("unparseable scene payload: {0}")]
    Parse(String),

    /// Payload parsed, but was written by an unknown format version.
    #[error("unsupported scene format version {0}")]
    Version(u32),

    /// Payload parsed, but its contents violate scene invariants.
    #[error("invalid scene contents: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            MalformedSceneError::Parse("x".into())
                .to_string()
                .contains("unparseable scene payload:")
        );
        assert!(
            MalformedSceneError::Version(9)
                .to_string()
                .contains("version 9")
        );
        assert!(
            MalformedSceneError::Invalid("x".into())
                .to_string()
                .contains("invalid scene contents:")
        );
    }
}
