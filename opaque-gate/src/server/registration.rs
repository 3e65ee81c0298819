//! Server half of the registration flow: a stateless request/response pair.

use opaque_ke::ServerRegistration;
use tracing::instrument;

use crate::{
    codec,
    config::suite::OpaqueSuite,
    error::{OpaqueGateError, Result},
    types::AccountName,
};

/// Evaluate the OPRF over a blinded registration request.
///
/// The OPRF key is derived from the setup's seed and `account_identifier`,
/// so distinct accounts get unlinkable keys.
#[instrument(skip_all)]
pub fn create_response(
    server_setup: &str,
    account_identifier: &AccountName,
    registration_request: &str,
) -> Result<String> {
    let setup = codec::server_setup("serverSetup", server_setup)?;
    let request = codec::registration_request("registrationRequest", registration_request)?;

    let start_result =
        ServerRegistration::<OpaqueSuite>::start(&setup, request, account_identifier.as_bytes())
            .map_err(|error| OpaqueGateError::protocol("serverCreateRegistrationResponse", error))?;

    Ok(codec::encode(start_result.message.serialize()))
}

/// Validate a client-produced registration record and return the storable
/// form. The bytes pass through unchanged once they parse.
#[instrument(skip_all)]
pub fn finish(registration_record: &str) -> Result<String> {
    let upload = codec::registration_upload("registrationRecord", registration_record)?;
    let record = ServerRegistration::finish(upload);
    Ok(codec::encode(record.serialize()))
}
