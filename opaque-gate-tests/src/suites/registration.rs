use anyhow::Result;

use crate::{runner::TestCase, utils};

pub fn cases() -> Vec<TestCase> {
    vec![
        TestCase {
            name: "registration produces a storable record",
            run: registration_produces_storable_record,
        },
        TestCase {
            name: "server public key matches the key observed by the client",
            run: server_public_key_matches_observed_key,
        },
        TestCase {
            name: "result payloads serialize with protocol field names",
            run: result_payloads_use_protocol_field_names,
        },
    ]
}

fn registration_produces_storable_record() -> Result<()> {
    let engine = utils::engine()?;
    let account = utils::tagged("user");

    let server_setup = engine.create_server_setup()?;
    let started = engine.client_start_registration("hunter42")?;
    let registration_response = engine.server_create_registration_response(
        &server_setup,
        &account,
        &started.registration_request,
    )?;
    let finished = engine.client_finish_registration(
        "hunter42",
        &started.client_registration_state,
        &registration_response,
        None,
    )?;

    // The validated record is byte-identical to the client upload.
    let registration_record = engine.server_finish_registration(&finished.registration_record)?;
    assert_eq!(registration_record, finished.registration_record);
    assert!(!finished.export_key.is_empty());

    Ok(())
}

fn server_public_key_matches_observed_key() -> Result<()> {
    let engine = utils::engine()?;
    let account = utils::tagged("user");
    let registered = utils::register(&engine, &account, "hunter42", None)?;

    let public_key = engine.get_server_public_key(&registered.server_setup)?;
    assert_eq!(public_key, registered.server_static_public_key);

    // Pure projection: repeated calls agree.
    assert_eq!(public_key, engine.get_server_public_key(&registered.server_setup)?);

    Ok(())
}

fn result_payloads_use_protocol_field_names() -> Result<()> {
    let engine = utils::engine()?;
    let started = engine.client_start_registration("hunter42")?;

    let json = serde_json::to_value(&started)?;
    assert!(json.get("clientRegistrationState").is_some());
    assert!(json.get("registrationRequest").is_some());

    Ok(())
}
