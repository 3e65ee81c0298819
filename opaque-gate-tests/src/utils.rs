//! Shared helpers for the test suites.

use anyhow::Result;
use opaque_gate::{config::Config, identity::CustomIdentifiers, Engine};
use rand::{distributions::Alphanumeric, Rng};

/// Add random text to the end of a string
/// # Example
/// ```text
/// let user = tagged("user");
/// // "user-1h65k35"
/// ```
pub fn tagged(text: impl AsRef<str>) -> String {
    let text = text.as_ref();
    let tag: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(7)
        .map(char::from)
        .collect();

    format!("{text}-{tag}")
}

/// A fresh engine in the `Ready` state.
pub fn engine() -> Result<Engine> {
    let engine = Engine::new();
    engine.initialize(&Config::default())?;
    Ok(engine)
}

/// Everything a login attempt needs after a completed registration.
pub struct RegisteredAccount {
    pub server_setup: String,
    pub registration_record: String,
    pub export_key: String,
    pub server_static_public_key: String,
}

/// Run a full registration flow against `engine`.
pub fn register(
    engine: &Engine,
    account_identifier: &str,
    password: &str,
    identifiers: Option<&CustomIdentifiers>,
) -> Result<RegisteredAccount> {
    let server_setup = engine.create_server_setup()?;

    let started = engine.client_start_registration(password)?;
    let registration_response = engine.server_create_registration_response(
        &server_setup,
        account_identifier,
        &started.registration_request,
    )?;
    let finished = engine.client_finish_registration(
        password,
        &started.client_registration_state,
        &registration_response,
        identifiers,
    )?;
    let registration_record = engine.server_finish_registration(&finished.registration_record)?;

    Ok(RegisteredAccount {
        server_setup,
        registration_record,
        export_key: finished.export_key,
        server_static_public_key: finished.server_static_public_key,
    })
}
