use foundation::ids::{CommandId, SessionId};
use thiserror::Error;

/// An acknowledgement the session could not apply. State is unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AckError {
    #[error("no session `{0}` on this host")]
    UnknownSession(SessionId),
    #[error("session `{session}` has no outstanding command {id}")]
    UnknownCommand { session: SessionId, id: CommandId },
    #[error("command {id} ({command}) cannot be acknowledged with {ack}")]
    UnexpectedAck {
        id: CommandId,
        command: &'static str,
        ack: &'static str,
    },
}

/// Teardown problems. Logged, never returned: teardown always completes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TeardownError {
    #[error("destroying view with {outstanding} unacknowledged commands after {waited_s}s")]
    ForcedDestroy { outstanding: usize, waited_s: f64 },
    #[error("acknowledgement for unknown command {0} during teardown")]
    UnknownAck(CommandId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("invalid dev server url `{url}`: {reason}")]
    InvalidDevServerUrl { url: String, reason: String },
}
