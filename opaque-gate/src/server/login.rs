//! Server half of the login flow.
//!
//! The start step must answer with a structurally and size-equivalent
//! response whether or not a registration record exists for the account;
//! otherwise response shape would reveal account existence. For an absent
//! record the primitives library synthesizes credentials deterministically
//! from the setup and the account identifier, so even replayed probes see
//! stable answers.

use opaque_ke::{ServerLogin, ServerLoginStartParameters};
use rand::{CryptoRng, RngCore};
use tracing::{debug, instrument};

use crate::{
    codec,
    config::suite::OpaqueSuite,
    error::{OpaqueGateError, Result},
    identity::{self, CustomIdentifiers},
    types::{login::server::LoginStarted, AccountName},
};

/// Answer a login request, with the real registration record when one exists
/// and an indistinguishable dummy otherwise.
#[instrument(skip_all)]
pub fn start(
    rng: &mut (impl CryptoRng + RngCore),
    server_setup: &str,
    account_identifier: &AccountName,
    registration_record: Option<&str>,
    login_request: &str,
    identifiers: Option<&CustomIdentifiers>,
) -> Result<LoginStarted> {
    let setup = codec::server_setup("serverSetup", server_setup)?;
    let request = codec::credential_request("loginRequest", login_request)?;

    let record = registration_record
        .map(|record| codec::registration_record("registrationRecord", record))
        .transpose()?;

    if record.is_none() {
        debug!("no registration record supplied; answering with synthesized credentials");
    }

    let start_result = ServerLogin::start(
        rng,
        &setup,
        record,
        request,
        account_identifier.as_bytes(),
        ServerLoginStartParameters {
            context: None,
            identifiers: identity::resolve(identifiers),
        },
    )
    .map_err(|error| OpaqueGateError::protocol("serverStartLogin", error))?;

    Ok(LoginStarted {
        server_login_state: codec::encode(start_result.state.serialize()),
        login_response: codec::encode(start_result.message.serialize()),
    })
}

/// Finalize a login attempt and return the session key.
#[instrument(skip_all)]
pub fn finish(server_login_state: &str, finish_login_request: &str) -> Result<String> {
    let state = codec::server_login("serverLoginState", server_login_state)?;
    let finalization = codec::credential_finalization("finishLoginRequest", finish_login_request)?;

    let finish_result = state
        .finish(finalization)
        .map_err(|error| OpaqueGateError::protocol("serverFinishLogin", error))?;

    Ok(codec::encode(finish_result.session_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_rejects_malformed_state_and_request() {
        let error = finish("", "").unwrap_err();
        assert_eq!(
            error.to_string(),
            "opaque protocol error at \"deserialize serverLoginState\"; Internal error encountered"
        );

        let error = finish("a", "").unwrap_err();
        assert_eq!(
            error.to_string(),
            "base64 decoding failed at \"serverLoginState\"; Encoded text cannot have a 6-bit remainder."
        );
    }
}
