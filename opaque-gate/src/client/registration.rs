//! Client half of the registration flow: a two-step state machine whose
//! state survives a round trip over the caller's transport.

use opaque_ke::{ClientRegistration, ClientRegistrationFinishParameters};
use rand::{CryptoRng, RngCore};
use tracing::instrument;

use crate::{
    codec,
    config::suite::OpaqueSuite,
    error::{OpaqueGateError, Result},
    identity::{self, CustomIdentifiers},
    types::{
        registration::client::{RegistrationFinished, RegistrationStarted},
        Password,
    },
};

/// Begin registration by blinding `password` with fresh randomness.
#[instrument(skip_all)]
pub fn start(
    rng: &mut (impl CryptoRng + RngCore),
    password: &Password,
) -> Result<RegistrationStarted> {
    let start_result = ClientRegistration::<OpaqueSuite>::start(rng, password.as_bytes())
        .map_err(|error| OpaqueGateError::protocol("clientStartRegistration", error))?;

    Ok(RegistrationStarted {
        client_registration_state: codec::encode(start_result.state.serialize()),
        registration_request: codec::encode(start_result.message.serialize()),
    })
}

/// Finish registration: unblind the server's response, derive the export
/// key, and seal the envelope binding the resolved identifiers and the
/// server's static public key.
///
/// The state produced by [`start`] is consumed here and must not be reused.
#[instrument(skip_all)]
pub fn finish(
    rng: &mut (impl CryptoRng + RngCore),
    password: &Password,
    client_registration_state: &str,
    registration_response: &str,
    identifiers: Option<&CustomIdentifiers>,
) -> Result<RegistrationFinished> {
    let state = codec::client_registration("clientRegistrationState", client_registration_state)?;
    let response = codec::registration_response("registrationResponse", registration_response)?;

    let finish_result = state
        .finish(
            rng,
            password.as_bytes(),
            response,
            ClientRegistrationFinishParameters::new(identity::resolve(identifiers), None),
        )
        .map_err(|error| OpaqueGateError::protocol("clientFinishRegistration", error))?;

    Ok(RegistrationFinished {
        registration_record: codec::encode(finish_result.message.serialize()),
        export_key: codec::encode(finish_result.export_key),
        server_static_public_key: codec::encode(finish_result.server_s_pk.serialize()),
    })
}
