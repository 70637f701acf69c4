//! Account credentials supplied at construction

use crate::config::AccountConfig;

/// Email/password/nickname triple. Immutable once built.
#[derive(Clone)]
pub struct Credentials {
    email: String,
    password: String,
    nickname: String,
}

impl Credentials {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        nickname: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            nickname: nickname.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }
}

impl From<&AccountConfig> for Credentials {
    fn from(account: &AccountConfig) -> Self {
        Self::new(&account.email, &account.password, &account.nickname)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("nickname", &self.nickname)
            .finish()
    }
}
