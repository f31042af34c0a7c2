//! Error types for the game crate

use ditto_core::DittoError;
use ditto_scripting::ScriptError;

/// Game-specific error types
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A script failed; kept whole so callers can report its location
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Map not found
    #[error("Map not found: {0}")]
    MapNotFound(String),
}

impl GameError {
    /// Author-facing description, one line per entry
    pub fn describe(&self) -> Vec<String> {
        match self {
            GameError::Script(err) => err.describe(),
            GameError::MapNotFound(_) => vec![self.to_string()],
        }
    }
}

impl From<GameError> for DittoError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::Script(err) => err.into(),
            GameError::MapNotFound(name) => DittoError::NotFound(format!("map {}", name)),
        }
    }
}

/// Result type for game operations
pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ditto_scripting::{Origin, Script};

    #[test]
    fn test_script_error_keeps_location() {
        let err: GameError = Script::compile("print 1\nprint 2;", Origin::new("town.txt", "sign"))
            .unwrap_err()
            .into();

        let GameError::Script(script_err) = &err else {
            panic!("expected a script error, got {err:?}");
        };
        assert_eq!(script_err.location().map(|l| l.line), Some(2));
        assert_eq!(err.describe()[0], "Syntax error!");
    }

    #[test]
    fn test_into_core_error() {
        let err: DittoError = GameError::MapNotFound("sea".into()).into();
        assert!(matches!(err, DittoError::NotFound(ref what) if what == "map sea"));
    }
}
