//! Transport-safe encoding and checked decoding of protocol values.
//!
//! Every field that crosses the protocol boundary is carried as URL-safe,
//! unpadded base64 text. Decoding runs in two checked stages: the text must
//! first decode to raw bytes ([`decode`]), and the bytes must then parse as
//! the expected protocol value. Each stage fails with an error naming the
//! offending field; the second stage never reveals *how* the bytes failed to
//! parse.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use opaque_ke::{
    ClientLogin, ClientRegistration, CredentialFinalization, CredentialRequest,
    CredentialResponse, RegistrationRequest, RegistrationResponse, RegistrationUpload,
    ServerLogin, ServerRegistration, ServerSetup,
};

use crate::{
    config::suite::OpaqueSuite,
    error::{OpaqueGateError, Result},
};

/// Encode bytes for transport.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Stage one: transport text to raw bytes.
pub fn decode(field: &'static str, encoded: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|error| OpaqueGateError::Base64 { field, error })
}

macro_rules! checked_decoder {
    ($(#[$attr:meta])* $name:ident => $ty:ty) => {
        $(#[$attr])*
        pub(crate) fn $name(field: &'static str, encoded: &str) -> Result<$ty> {
            let bytes = decode(field, encoded)?;
            <$ty>::deserialize(&bytes)
                .map_err(|error| OpaqueGateError::deserialize(field, error))
        }
    };
}

checked_decoder!(
    /// Stage two decoder for the server's long-term setup.
    server_setup => ServerSetup<OpaqueSuite>
);
checked_decoder!(registration_request => RegistrationRequest<OpaqueSuite>);
checked_decoder!(registration_response => RegistrationResponse<OpaqueSuite>);
checked_decoder!(registration_upload => RegistrationUpload<OpaqueSuite>);
checked_decoder!(
    /// Stage two decoder for a stored registration record (password file).
    registration_record => ServerRegistration<OpaqueSuite>
);
checked_decoder!(client_registration => ClientRegistration<OpaqueSuite>);
checked_decoder!(client_login => ClientLogin<OpaqueSuite>);
checked_decoder!(server_login => ServerLogin<OpaqueSuite>);
checked_decoder!(credential_request => CredentialRequest<OpaqueSuite>);
checked_decoder!(credential_response => CredentialResponse<OpaqueSuite>);
checked_decoder!(credential_finalization => CredentialFinalization<OpaqueSuite>);
