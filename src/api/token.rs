use std::sync::RwLock;

/// Bearer-token storage capability. The backend issues one token per login;
/// every authenticated request attaches it when present.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: String);
    fn clear(&self);
}

/// Session-scoped store; nothing outlives the process.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.read().expect("token lock poisoned").clone()
    }

    fn set(&self, token: String) {
        *self.token.write().expect("token lock poisoned") = Some(token);
    }

    fn clear(&self) {
        *self.token.write().expect("token lock poisoned") = None;
    }
}
