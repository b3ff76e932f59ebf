use thiserror::Error;

/// Errors that can arise while progressing or persisting a game.
#[derive(Debug, Error)]
pub enum GameError {
    /// An enumerated input (parenting style, family background, attribute name) was not recognised.
    #[error("validation error: {0}")]
    Validation(String),

    /// The content generator returned an effect that cannot be applied. No state was mutated.
    #[error("malformed effect: {0}")]
    MalformedEffect(String),

    /// The content generator returned a scene that does not fit the scene schema.
    #[error("malformed scene: {0}")]
    MalformedScene(String),

    /// The action's requirement gate failed before any roll was drawn.
    #[error("requirement not met: {0}")]
    PreconditionNotMet(String),

    /// Attribute growth was requested while attributes are fixed for the session.
    #[error("character attributes are fixed for this session")]
    AttributesLocked,

    /// Returned when fetching a record or action that is not present.
    #[error("not found: {0}")]
    NotFound(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around JSON encoding errors (game state blobs, achievement lists).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
