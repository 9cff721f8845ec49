//! Account credentials for the Studio API.

use crate::error::{Result, StepsError};

pub const ACCOUNT_SID_VAR: &str = "TWILIO_ACCOUNT_SID";
pub const AUTH_TOKEN_VAR: &str = "TWILIO_AUTH_TOKEN";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub account_sid: String,
    pub auth_token: String,
}

// Keep the token out of logs and panic messages.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Resolve credentials from explicit flags, falling back to `lookup` for
/// [`ACCOUNT_SID_VAR`] and [`AUTH_TOKEN_VAR`]. Empty values count as unset.
pub fn resolve<F>(account: Option<&str>, password: Option<&str>, lookup: F) -> Result<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    let pick = |flag: Option<&str>, var: &str| {
        flag.filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| lookup(var).filter(|v| !v.is_empty()))
    };

    match (pick(account, ACCOUNT_SID_VAR), pick(password, AUTH_TOKEN_VAR)) {
        (Some(account_sid), Some(auth_token)) => Ok(Credentials {
            account_sid,
            auth_token,
        }),
        _ => Err(StepsError::MissingCredentials),
    }
}
