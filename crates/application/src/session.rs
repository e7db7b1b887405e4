use std::cell::{Cell, RefCell};

use lite_market_domain::UserId;
use tracing::{debug, info};

use crate::{ApplicationError, Credentials, IdentityProvider, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type SessionCallback = Box<dyn FnMut(Option<&Session>)>;

/// Owns the signed-in session and tells subscribers when it changes.
///
/// Callbacks run synchronously after each change. Subscribing from inside a
/// callback takes effect for the next change; unsubscribing from inside one
/// takes effect immediately, including for the callback itself.
pub struct SessionStore {
    provider: Box<dyn IdentityProvider>,
    session: RefCell<Option<Session>>,
    subscribers: RefCell<Vec<(SubscriptionId, SessionCallback)>>,
    /// Subscriptions detached from `subscribers` while their callbacks run.
    notifying: RefCell<Vec<SubscriptionId>>,
    next_subscription: Cell<u64>,
}

impl SessionStore {
    pub fn new(provider: Box<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            session: RefCell::new(None),
            subscribers: RefCell::new(Vec::new()),
            notifying: RefCell::new(Vec::new()),
            next_subscription: Cell::new(1),
        }
    }

    /// Loads any session the provider already holds.
    pub fn bootstrap(&self) -> Result<(), ApplicationError> {
        let session = self.provider.current_session()?;
        self.replace(session);
        Ok(())
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session, ApplicationError> {
        let session = self.provider.sign_in(&Credentials {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        info!(user_id = %session.user_id, "signed in");
        self.replace(Some(session.clone()));
        Ok(session)
    }

    pub fn sign_up(&self, email: &str, password: &str) -> Result<Session, ApplicationError> {
        let session = self.provider.sign_up(&Credentials {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        info!(user_id = %session.user_id, "signed up");
        self.replace(Some(session.clone()));
        Ok(session)
    }

    pub fn sign_out(&self) -> Result<(), ApplicationError> {
        self.provider.sign_out()?;
        self.replace(None);
        Ok(())
    }

    pub fn current(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    pub fn require_user_id(&self) -> Result<UserId, ApplicationError> {
        self.session
            .borrow()
            .as_ref()
            .map(|session| session.user_id.clone())
            .ok_or(ApplicationError::NotAuthenticated)
    }

    pub fn subscribe(&self, callback: impl FnMut(Option<&Session>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        if before != subscribers.len() {
            return true;
        }

        let mut notifying = self.notifying.borrow_mut();
        let before = notifying.len();
        notifying.retain(|existing| *existing != id);
        before != notifying.len()
    }

    fn replace(&self, session: Option<Session>) {
        *self.session.borrow_mut() = session;
        let current = self.current();

        let mut notified = std::mem::take(&mut *self.subscribers.borrow_mut());
        self.notifying
            .borrow_mut()
            .extend(notified.iter().map(|(id, _)| *id));
        debug!(subscribers = notified.len(), "session changed");
        for (id, callback) in notified.iter_mut() {
            let live = self.notifying.borrow().contains(id);
            if live {
                callback(current.as_ref());
            }
        }

        let mut notifying = self.notifying.borrow_mut();
        notified.retain(|(id, _)| notifying.contains(id));
        notifying.retain(|id| !notified.iter().any(|(kept, _)| kept == id));
        drop(notifying);

        let mut subscribers = self.subscribers.borrow_mut();
        notified.append(&mut subscribers);
        *subscribers = notified;
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    struct FakeProvider;

    impl IdentityProvider for FakeProvider {
        fn current_session(&self) -> Result<Option<Session>, ApplicationError> {
            Ok(None)
        }

        fn sign_in(&self, credentials: &Credentials) -> Result<Session, ApplicationError> {
            if credentials.password.is_empty() {
                return Err(ApplicationError::InvalidCredentials);
            }
            Ok(Session {
                user_id: UserId::new("user_1")?,
                email: credentials.email.clone(),
                display_name: None,
            })
        }

        fn sign_up(&self, credentials: &Credentials) -> Result<Session, ApplicationError> {
            self.sign_in(credentials)
        }

        fn sign_out(&self) -> Result<(), ApplicationError> {
            Ok(())
        }
    }

    #[test]
    fn require_user_id_fails_until_signed_in() {
        let store = SessionStore::new(Box::new(FakeProvider));
        store.bootstrap().expect("bootstrap");
        assert!(matches!(
            store.require_user_id(),
            Err(ApplicationError::NotAuthenticated)
        ));

        store.sign_in("a@b.c", "pw").expect("sign in");
        assert_eq!(store.require_user_id().expect("user").as_str(), "user_1");

        store.sign_out().expect("sign out");
        assert!(store.current().is_none());
    }

    #[test]
    fn subscribers_see_changes_until_unsubscribed() {
        let store = SessionStore::new(Box::new(FakeProvider));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |session| {
            sink.borrow_mut()
                .push(session.map(|session| session.email.clone()));
        });

        store.sign_in("a@b.c", "pw").expect("sign in");
        store.sign_out().expect("sign out");
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.sign_in("x@y.z", "pw").expect("sign in again");

        assert_eq!(*seen.borrow(), vec![Some("a@b.c".to_string()), None]);
    }

    #[test]
    fn callback_can_unsubscribe_itself() {
        let store = Rc::new(SessionStore::new(Box::new(FakeProvider)));
        let own_id = Rc::new(Cell::new(None::<SubscriptionId>));
        let calls = Rc::new(Cell::new(0));
        let removed = Rc::new(Cell::new(false));

        let handle = Rc::downgrade(&store);
        let id = store.subscribe({
            let own_id = Rc::clone(&own_id);
            let calls = Rc::clone(&calls);
            let removed = Rc::clone(&removed);
            move |_| {
                calls.set(calls.get() + 1);
                if let (Some(store), Some(id)) = (handle.upgrade(), own_id.get()) {
                    removed.set(store.unsubscribe(id));
                }
            }
        });
        own_id.set(Some(id));

        store.sign_in("a@b.c", "pw").expect("sign in");
        store.sign_out().expect("sign out");

        assert!(removed.get());
        assert_eq!(calls.get(), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn callback_can_unsubscribe_a_later_subscriber() {
        let store = Rc::new(SessionStore::new(Box::new(FakeProvider)));
        let later_calls = Rc::new(Cell::new(0));
        let later_id = Rc::new(Cell::new(None::<SubscriptionId>));

        let handle = Rc::downgrade(&store);
        store.subscribe({
            let later_id = Rc::clone(&later_id);
            move |_| {
                if let (Some(store), Some(id)) = (handle.upgrade(), later_id.get()) {
                    store.unsubscribe(id);
                }
            }
        });
        let id = store.subscribe({
            let later_calls = Rc::clone(&later_calls);
            move |_| later_calls.set(later_calls.get() + 1)
        });
        later_id.set(Some(id));

        store.sign_in("a@b.c", "pw").expect("sign in");
        assert_eq!(later_calls.get(), 0);
    }

    #[test]
    fn sign_up_starts_a_session_and_notifies() {
        let store = SessionStore::new(Box::new(FakeProvider));
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        store.subscribe(move |session| {
            if session.is_some() {
                sink.set(sink.get() + 1);
            }
        });

        let session = store.sign_up("new@b.c", "pw").expect("sign up");
        assert_eq!(session.email, "new@b.c");
        assert_eq!(store.current(), Some(session));
        assert_eq!(seen.get(), 1);
        assert!(matches!(
            store.sign_up("new@b.c", ""),
            Err(ApplicationError::InvalidCredentials)
        ));
    }

    #[test]
    fn failed_sign_in_keeps_previous_session() {
        let store = SessionStore::new(Box::new(FakeProvider));
        store.sign_in("a@b.c", "pw").expect("sign in");
        assert!(matches!(
            store.sign_in("a@b.c", ""),
            Err(ApplicationError::InvalidCredentials)
        ));
        assert_eq!(store.current().expect("session").email, "a@b.c");
    }
}
