use thiserror::Error;

/// Expected, user-fixable failures raised out of the engine's entry points.
///
/// These are surfaced through the host's message channel as a single-line
/// echo; everything else goes to the developer log.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested action is not present in the picker's action map.
    #[error("unknown action '{name}'")]
    UnknownAction { name: String },

    /// A session was saved under a name reserved for the engine itself.
    #[error("session name '{name}' is reserved")]
    ReservedName { name: String },

    /// A processor was asked to do work after it had been disposed.
    #[error("processor used after disposal")]
    Disposed,

    /// A picker was started before its UI surface was acquired.
    #[error("picker started before open")]
    NotOpened,
}

impl EngineError {
    #[must_use]
    pub fn unknown_action(name: impl Into<String>) -> Self {
        Self::UnknownAction { name: name.into() }
    }

    #[must_use]
    pub fn reserved_name(name: impl Into<String>) -> Self {
        Self::ReservedName { name: name.into() }
    }
}
