//! Checks that malformed transport input produces the fixed error shapes,
//! with the encoding check always running before the structural check.

use anyhow::Result;

use crate::{runner::TestCase, utils};

pub fn cases() -> Vec<TestCase> {
    vec![
        TestCase {
            name: "malformed server setup produces the fixed messages",
            run: malformed_server_setup,
        },
        TestCase {
            name: "malformed registration request produces the fixed messages",
            run: malformed_registration_request,
        },
        TestCase {
            name: "malformed registration record produces the fixed messages",
            run: malformed_registration_record,
        },
        TestCase {
            name: "malformed login request produces the fixed messages",
            run: malformed_login_request,
        },
        TestCase {
            name: "malformed client login state produces the fixed messages",
            run: malformed_client_login_state,
        },
    ]
}

fn malformed_server_setup() -> Result<()> {
    let engine = utils::engine()?;
    let started = engine.client_start_registration("hunter2")?;

    // A single non-decodable character fails the encoding stage.
    let error = engine
        .server_create_registration_response("a", "user1", &started.registration_request)
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "base64 decoding failed at \"serverSetup\"; Encoded text cannot have a 6-bit remainder."
    );

    // Validly encoded but structurally wrong bytes fail the second stage.
    let error = engine
        .server_create_registration_response("abcd", "user1", &started.registration_request)
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "opaque protocol error at \"deserialize serverSetup\"; Internal error encountered"
    );

    Ok(())
}

fn malformed_registration_request() -> Result<()> {
    let engine = utils::engine()?;
    let server_setup = engine.create_server_setup()?;

    let error = engine
        .server_create_registration_response(&server_setup, "user1", "a")
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "base64 decoding failed at \"registrationRequest\"; Encoded text cannot have a 6-bit remainder."
    );

    let error = engine
        .server_create_registration_response(&server_setup, "user1", "")
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "opaque protocol error at \"deserialize registrationRequest\"; Internal error encountered"
    );

    Ok(())
}

fn malformed_registration_record() -> Result<()> {
    let engine = utils::engine()?;

    let error = engine.server_finish_registration("a").unwrap_err();
    assert_eq!(
        error.to_string(),
        "base64 decoding failed at \"registrationRecord\"; Encoded text cannot have a 6-bit remainder."
    );

    let error = engine.server_finish_registration("").unwrap_err();
    assert_eq!(
        error.to_string(),
        "opaque protocol error at \"deserialize registrationRecord\"; Internal error encountered"
    );

    Ok(())
}

fn malformed_login_request() -> Result<()> {
    let engine = utils::engine()?;
    let server_setup = engine.create_server_setup()?;

    let error = engine
        .server_start_login(&server_setup, "user1", None, "a", None)
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "base64 decoding failed at \"loginRequest\"; Encoded text cannot have a 6-bit remainder."
    );

    let error = engine
        .server_start_login(&server_setup, "user1", None, "", None)
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "opaque protocol error at \"deserialize loginRequest\"; Internal error encountered"
    );

    Ok(())
}

fn malformed_client_login_state() -> Result<()> {
    let engine = utils::engine()?;

    // Structural damage is an error, unlike a legitimate failed login.
    let error = engine
        .client_finish_login("hunter2", "a", "", None)
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "base64 decoding failed at \"clientLoginState\"; Encoded text cannot have a 6-bit remainder."
    );

    let error = engine
        .client_finish_login("hunter2", "", "", None)
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "opaque protocol error at \"deserialize clientLoginState\"; Internal error encountered"
    );

    Ok(())
}
