//! Read-only view of the current token.

use tokio::sync::watch;

use super::state::Session;

/// Receiver half of the session channel, handed to the gateway.
///
/// Holders can read the token but never change session state.
#[derive(Debug, Clone)]
pub struct Credentials {
    rx: watch::Receiver<Session>,
}

impl Credentials {
    #[must_use]
    pub fn new(rx: watch::Receiver<Session>) -> Self {
        Self { rx }
    }

    /// Credentials that never carry a token, for unauthenticated gateways.
    #[must_use]
    pub fn anonymous() -> Self {
        let (_tx, rx) = watch::channel(Session::default());
        Self { rx }
    }

    /// Token current at the moment of the call.
    #[must_use]
    pub fn bearer_token(&self) -> Option<String> {
        self.rx.borrow().bearer().map(ToOwned::to_owned)
    }

    /// Current token together with the generation of the session holding it.
    #[must_use]
    pub(crate) fn bearer_with_generation(&self) -> Option<(String, u64)> {
        let session = self.rx.borrow();
        session.bearer().map(|token| (token.to_owned(), session.generation()))
    }
}
