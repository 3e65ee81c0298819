//! Identity binding for the key-exchange transcript.

use opaque_ke::Identifiers;
use serde::{Deserialize, Serialize};

/// Optional overrides for the identity strings bound into the transcript.
///
/// When an override is absent the transcript falls back to the account's own
/// key material: the client identity defaults to the credential registered
/// for the account, the server identity to the server's static public key.
/// Registration and login must resolve identifiers identically; any
/// divergence makes the login finish step report a failed outcome rather
/// than a distinct error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct CustomIdentifiers {
    pub client: Option<String>,
    pub server: Option<String>,
}

impl CustomIdentifiers {
    /// Borrow the overrides in the form the primitives library consumes.
    fn as_identifiers(&self) -> Identifiers<'_> {
        Identifiers {
            client: self.client.as_deref().map(str::as_bytes),
            server: self.server.as_deref().map(str::as_bytes),
        }
    }
}

/// Resolve an optional set of overrides. Absent overrides resolve to the
/// transcript defaults.
pub(crate) fn resolve(identifiers: Option<&CustomIdentifiers>) -> Identifiers<'_> {
    identifiers
        .map(CustomIdentifiers::as_identifiers)
        .unwrap_or_default()
}
