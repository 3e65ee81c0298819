//! Client half of the login flow.
//!
//! The finish step is where the failure-shape discipline lives: a wrong
//! password, a tampered credential response, and mismatched identifiers all
//! collapse into the same [`LoginOutcome::Failed`] value. Only structural
//! damage to the inputs is reported as an error.

use opaque_ke::errors::ProtocolError;
use opaque_ke::{ClientLogin, ClientLoginFinishParameters};
use rand::{CryptoRng, RngCore};
use tracing::instrument;

use crate::{
    codec,
    config::suite::OpaqueSuite,
    error::{OpaqueGateError, Result},
    identity::{self, CustomIdentifiers},
    types::{
        login::client::{LoginFinished, LoginOutcome, LoginStarted},
        Password,
    },
};

/// Begin a login attempt by blinding `password` with fresh randomness.
#[instrument(skip_all)]
pub fn start(rng: &mut (impl CryptoRng + RngCore), password: &Password) -> Result<LoginStarted> {
    let start_result = ClientLogin::<OpaqueSuite>::start(rng, password.as_bytes())
        .map_err(|error| OpaqueGateError::protocol("clientStartLogin", error))?;

    Ok(LoginStarted {
        client_login_state: codec::encode(start_result.state.serialize()),
        login_request: codec::encode(start_result.message.serialize()),
    })
}

/// Finish a login attempt: unblind the response, open the envelope, and
/// derive the session and export keys.
///
/// Returns [`LoginOutcome::Success`] only when the password is correct, the
/// envelope authenticates, and the resolved identifiers match the ones bound
/// at registration time.
#[instrument(skip_all)]
pub fn finish(
    password: &Password,
    client_login_state: &str,
    login_response: &str,
    identifiers: Option<&CustomIdentifiers>,
) -> Result<LoginOutcome> {
    let state = codec::client_login("clientLoginState", client_login_state)?;
    let response = codec::credential_response("loginResponse", login_response)?;

    let finish_result = match state.finish(
        password.as_bytes(),
        response,
        ClientLoginFinishParameters::new(None, identity::resolve(identifiers), None),
    ) {
        Ok(finish_result) => finish_result,
        // Wrong password, tampered response, and identifier mismatch all
        // surface here and must stay indistinguishable.
        Err(ProtocolError::InvalidLoginError) => return Ok(LoginOutcome::Failed),
        Err(error) => return Err(OpaqueGateError::protocol("clientFinishLogin", error)),
    };

    Ok(LoginOutcome::Success(LoginFinished {
        finish_login_request: codec::encode(finish_result.message.serialize()),
        session_key: codec::encode(finish_result.session_key),
        export_key: codec::encode(finish_result.export_key),
        server_static_public_key: codec::encode(finish_result.server_s_pk.serialize()),
    }))
}
