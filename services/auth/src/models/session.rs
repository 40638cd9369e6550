//! Session model and related functionality

use super::{Role, SessionUser};

/// Snapshot of the client-held session
///
/// `is_authenticated` is derived, so it can never disagree with the presence
/// of both a user and a token.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<SessionUser>,
    pub token: Option<String>,
    /// True once the restore-from-storage attempt has run
    pub is_ready: bool,
}

impl Session {
    /// Whether both a user and a bearer token are held
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    /// Role of the signed-in user
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().and_then(SessionUser::role)
    }

    /// Bearer token and user, when signed in
    pub fn credentials(&self) -> Option<(&str, &SessionUser)> {
        match (&self.token, &self.user) {
            (Some(token), Some(user)) => Some((token.as_str(), user)),
            _ => None,
        }
    }
}
