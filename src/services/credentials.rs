use std::sync::RwLock;

/// Single source of the bearer credential used for authenticated backend calls.
/// Acquisition and refresh happen elsewhere; this only hands out the current token.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Credential held in memory, replaceable on sign-in and clearable on sign-out.
#[derive(Debug, Default)]
pub struct SessionCredential {
    token: RwLock<Option<String>>,
}

impl SessionCredential {
    pub fn new(token: Option<String>) -> Self {
        SessionCredential {
            token: RwLock::new(token.filter(|t| !t.trim().is_empty())),
        }
    }

    pub fn set(&self, token: String) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token).filter(|t| !t.trim().is_empty());
    }

    pub fn clear(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

impl CredentialProvider for SessionCredential {
    fn bearer_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
