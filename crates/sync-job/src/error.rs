//! Sync error types.

use matsync_protocol::SlotError;

/// Errors produced by a material sync job.
///
/// `Display` carries diagnostic detail for logs; [`SyncError::user_message`]
/// is the fixed text meant for people.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("no printers eligible for material sync")]
    Configuration,

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolFault),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("material sync failed for printer(s): {}", failed.join(", "))]
    PartialSyncFailure { failed: Vec<String> },

    #[error("archive error: {0}")]
    Archive(String),

    #[error("sync job already started")]
    AlreadyStarted,
}

/// What was wrong with an exchange whose transport succeeded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolFault {
    #[error("response is not valid JSON: {0}")]
    Corrupted(String),

    #[error("response is missing the `{0}` field")]
    MissingField(&'static str),

    #[error("could not encode request: {0}")]
    Encode(String),
}

impl From<SlotError> for ProtocolFault {
    fn from(e: SlotError) -> Self {
        match e {
            SlotError::Corrupted(e) => ProtocolFault::Corrupted(e.to_string()),
            SlotError::MissingField(field) => ProtocolFault::MissingField(field),
        }
    }
}

/// Coarse classification of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Protocol,
    Transport,
    PartialSyncFailure,
    Archive,
    Usage,
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Configuration => ErrorKind::Configuration,
            SyncError::Protocol(_) => ErrorKind::Protocol,
            SyncError::Transport(_) => ErrorKind::Transport,
            SyncError::PartialSyncFailure { .. } => ErrorKind::PartialSyncFailure,
            SyncError::Archive(_) => ErrorKind::Archive,
            SyncError::AlreadyStarted => ErrorKind::Usage,
        }
    }

    /// Human-readable message for the completion notification.
    pub fn user_message(&self) -> &'static str {
        match self {
            SyncError::Configuration => "There are no printers to sync materials with.",
            SyncError::Protocol(ProtocolFault::Corrupted(_)) => {
                "The response from the cloud appears to be corrupted."
            }
            SyncError::Protocol(ProtocolFault::MissingField(_)) => {
                "The response from the cloud is missing important information."
            }
            SyncError::Protocol(ProtocolFault::Encode(_)) => {
                "Could not build the material upload request."
            }
            SyncError::Transport(_) => "Failed to connect to the cloud.",
            SyncError::PartialSyncFailure { .. } => {
                "Failed to connect to the cloud to sync materials with some of the printers."
            }
            SyncError::Archive(_) => "Could not prepare the material archive.",
            SyncError::AlreadyStarted => "This material sync has already been started.",
        }
    }

    /// Whether this error ends the whole job before any confirmation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Protocol | ErrorKind::Transport | ErrorKind::Archive
        )
    }
}
