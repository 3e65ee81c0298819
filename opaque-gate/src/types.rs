//! Value types shared across the protocol flows.

pub mod login;
pub mod registration;

use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::OpaqueGateError;

/// Longest input the OPRF hash-to-scalar step accepts.
const MAX_OPRF_INPUT_LENGTH: usize = u16::MAX as usize;

/// A client-held password. Zeroed on drop and redacted from debug output.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Password(Vec<u8>);

impl FromStr for Password {
    type Err = OpaqueGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_OPRF_INPUT_LENGTH {
            return Err(OpaqueGateError::Input(format!(
                "password exceeds the maximum length of {MAX_OPRF_INPUT_LENGTH} bytes"
            )));
        }
        Ok(Password(s.as_bytes().to_vec()))
    }
}

impl Password {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***REDACTED***)")
    }
}

/// Account name used as the human-memorable identifier for an account. The
/// server derives the account's OPRF key from this value, so the same string
/// must be supplied at registration and at every later login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountName(String);

impl Display for AccountName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AccountName> for String {
    fn from(account_name: AccountName) -> Self {
        account_name.0
    }
}

impl AsRef<str> for AccountName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountName {
    type Err = OpaqueGateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_OPRF_INPUT_LENGTH {
            return Err(OpaqueGateError::Input(format!(
                "account identifier exceeds the maximum length of {MAX_OPRF_INPUT_LENGTH} bytes"
            )));
        }
        Ok(Self(s.to_string()))
    }
}

impl AccountName {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_debug_output_is_redacted() {
        let password = Password::from_str("hunter42").unwrap();
        assert_eq!(format!("{password:?}"), "Password(***REDACTED***)");
    }

    #[test]
    fn oversized_password_is_rejected_before_any_crypto() {
        let oversized = "p".repeat(MAX_OPRF_INPUT_LENGTH + 1);
        let error = Password::from_str(&oversized).unwrap_err();
        assert!(matches!(error, OpaqueGateError::Input(_)));
    }

    #[test]
    fn account_name_round_trips_through_str() {
        let account_name = AccountName::from_str("user123").unwrap();
        assert_eq!(account_name.to_string(), "user123");
        assert_eq!(account_name.as_bytes(), b"user123");
    }
}
