use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use wayfare_core::auth::AuthUser;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<AuthUser>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum AuthAction {
    Start,
    Success(AuthUser),
    Failure(String),
    Logout,
    ClearError,
}

pub fn reduce(state: &AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::Start => AuthState {
            is_loading: true,
            error: None,
            ..state.clone()
        },
        AuthAction::Success(user) => AuthState {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
            error: None,
        },
        AuthAction::Failure(message) => AuthState {
            user: None,
            is_authenticated: false,
            is_loading: false,
            error: Some(message),
        },
        AuthAction::Logout => AuthState::default(),
        AuthAction::ClearError => AuthState {
            error: None,
            ..state.clone()
        },
    }
}

/// Signed-in user container, owned separately from the search store.
pub struct AuthStore {
    tx: watch::Sender<Arc<AuthState>>,
}

impl AuthStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(AuthState::default()));
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<AuthState>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Arc<AuthState> {
        self.tx.borrow().clone()
    }

    pub fn dispatch(&self, action: AuthAction) {
        self.tx.send_modify(|current| {
            *current = Arc::new(reduce(current, action));
        });
    }
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}
