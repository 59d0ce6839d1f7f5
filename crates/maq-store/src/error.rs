//! Gateway error taxonomy.
//!
//! Everything here is a value crossing a gateway boundary: persistence
//! and inference failures surface as `Result`s (or terminal progress
//! events) and never unwind into the editing session.

/// A blob upload that did not produce a URL. Non-fatal for saves: the
/// template record is still written with a null thumbnail reference.
#[derive(Debug, thiserror::Error)]
#[error("blob upload failed: {0}")]
pub struct UploadError(pub String);

/// The record store rejected an insert or update. The record is never
/// partially written.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("record insert rejected: {0}")]
    Insert(String),

    #[error("record update rejected: {0}")]
    Update(String),

    #[error("unknown template id {0:?}")]
    UnknownId(String),
}

/// A font resource that could not be fetched. Best-effort only: the
/// family is registered anyway and missing glyphs fall back to a
/// default face.
#[derive(Debug, thiserror::Error)]
#[error("font fetch failed for {family:?}: {reason}")]
pub struct FontFetchError {
    pub family: String,
    pub reason: String,
}

/// Background removal failed; the original image is untouched.
#[derive(Debug, thiserror::Error)]
#[error("background removal failed: {0}")]
pub struct InferenceError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            UploadError("503".into())
                .to_string()
                .contains("blob upload failed:")
        );
        assert!(
            PersistenceError::Insert("conflict".into())
                .to_string()
                .contains("record insert rejected:")
        );
        assert!(
            PersistenceError::UnknownId("tpl_9".into())
                .to_string()
                .contains("tpl_9")
        );
        assert!(
            InferenceError("oom".into())
                .to_string()
                .contains("background removal failed:")
        );
    }
}
