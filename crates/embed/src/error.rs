//! Embed error types.

use thiserror::Error;

/// Errors raised while resolving or rendering a single embedded entity.
///
/// These never escape [`EntityEmbedFilter::process`](crate::content::EntityEmbedFilter):
/// each one is logged and the offending marker is left in place.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("recursive rendering detected at depth {depth} (limit {limit})")]
    RecursiveRendering { depth: u32, limit: u32 },

    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("invalid entity id: {0}")]
    InvalidId(String),

    #[error("invalid entity uuid: {0}")]
    InvalidUuid(String),

    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

/// Result type alias using EmbedError.
pub type EmbedResult<T> = Result<T, EmbedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recursive_rendering_message() {
        let err = EmbedError::RecursiveRendering {
            depth: 21,
            limit: 20,
        };
        assert_eq!(
            err.to_string(),
            "recursive rendering detected at depth 21 (limit 20)"
        );
    }

    #[test]
    fn invalid_uuid_message() {
        let err = EmbedError::InvalidUuid("not-a-uuid".to_string());
        assert_eq!(err.to_string(), "invalid entity uuid: not-a-uuid");
    }

    #[test]
    fn host_error_converts_from_anyhow() {
        let err: EmbedError = anyhow::anyhow!("storage offline").into();
        assert!(matches!(err, EmbedError::Host(_)));
        assert_eq!(err.to_string(), "storage offline");
    }
}
