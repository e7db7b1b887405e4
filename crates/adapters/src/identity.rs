use std::cell::RefCell;

use lite_market_application::{ApplicationError, Credentials, IdentityProvider, Session};
use lite_market_domain::UserId;
use tracing::debug;

const MOCK_USER_ID: &str = "user_1";
const MOCK_DISPLAY_NAME: &str = "Mock User";

/// Offline identity provider: any non-empty email/password pair signs in as
/// the same local user.
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    session: RefCell<Option<Session>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn authenticate(&self, credentials: &Credentials) -> Result<Session, ApplicationError> {
        let email = credentials.email.trim().to_ascii_lowercase();
        if email.is_empty() || credentials.password.is_empty() {
            return Err(ApplicationError::InvalidCredentials);
        }

        let session = Session {
            user_id: UserId::new(MOCK_USER_ID)?,
            email,
            display_name: Some(MOCK_DISPLAY_NAME.to_string()),
        };
        debug!(user_id = %session.user_id, "mock session issued");
        *self.session.borrow_mut() = Some(session.clone());
        Ok(session)
    }
}

impl IdentityProvider for MockIdentityProvider {
    fn current_session(&self) -> Result<Option<Session>, ApplicationError> {
        Ok(self.session.borrow().clone())
    }

    fn sign_in(&self, credentials: &Credentials) -> Result<Session, ApplicationError> {
        self.authenticate(credentials)
    }

    fn sign_up(&self, credentials: &Credentials) -> Result<Session, ApplicationError> {
        self.authenticate(credentials)
    }

    fn sign_out(&self) -> Result<(), ApplicationError> {
        self.session.borrow_mut().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn normalizes_email_and_keeps_session() {
        let provider = MockIdentityProvider::new();
        let session = provider
            .sign_in(&credentials("  Seller@Example.COM ", "secret"))
            .expect("sign in");
        assert_eq!(session.email, "seller@example.com");
        assert_eq!(session.user_id.as_str(), MOCK_USER_ID);
        assert_eq!(
            provider.current_session().expect("current"),
            Some(session)
        );

        provider.sign_out().expect("sign out");
        assert_eq!(provider.current_session().expect("current"), None);
    }

    #[test]
    fn blank_credentials_are_rejected() {
        let provider = MockIdentityProvider::new();
        assert!(matches!(
            provider.sign_in(&credentials(" ", "secret")),
            Err(ApplicationError::InvalidCredentials)
        ));
        assert!(matches!(
            provider.sign_up(&credentials("a@b.c", "")),
            Err(ApplicationError::InvalidCredentials)
        ));
    }
}
