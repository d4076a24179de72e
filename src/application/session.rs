use std::sync::Arc;

use crate::domain::errors::DomainError;
use crate::domain::ports::{IdentityProvider, UserDirectory};
use crate::domain::user::CurrentUser;

/// Who is calling, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: CurrentUser,
    pub is_admin: bool,
}

impl Session {
    pub fn require_admin(&self) -> Result<(), DomainError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }
}

#[derive(Clone)]
pub struct Authenticator {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserDirectory>,
}

impl Authenticator {
    pub fn new(identity: Arc<dyn IdentityProvider>, users: Arc<dyn UserDirectory>) -> Self {
        Self { identity, users }
    }

    /// Blocking: the admin lookup hits the user directory.
    pub fn authenticate(&self, bearer_token: Option<&str>) -> Result<Session, DomainError> {
        let token = bearer_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(DomainError::Unauthenticated)?;
        let user = self.identity.current_user(token)?;
        let is_admin = self.users.is_admin(user.id)?;
        Ok(Session { user, is_admin })
    }
}
