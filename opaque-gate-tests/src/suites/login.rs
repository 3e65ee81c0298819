use anyhow::Result;
use opaque_gate::identity::CustomIdentifiers;

use crate::{runner::TestCase, utils};

pub fn cases() -> Vec<TestCase> {
    vec![
        TestCase {
            name: "client and server agree on the session key",
            run: session_key_agreement,
        },
        TestCase {
            name: "export key is stable across registration and login",
            run: export_key_stability,
        },
        TestCase {
            name: "wrong password yields a failed outcome",
            run: wrong_password_fails,
        },
        TestCase {
            name: "mismatched client identifier yields a failed outcome",
            run: mismatched_client_identifier_fails,
        },
        TestCase {
            name: "mismatched server identifier yields a failed outcome",
            run: mismatched_server_identifier_fails,
        },
        TestCase {
            name: "unknown account gets an indistinguishable dummy response",
            run: unknown_account_dummy_path,
        },
    ]
}

fn session_key_agreement() -> Result<()> {
    let engine = utils::engine()?;
    let account = utils::tagged("user");
    let registered = utils::register(&engine, &account, "hunter42", None)?;

    let started = engine.client_start_login("hunter42")?;
    let server_started = engine.server_start_login(
        &registered.server_setup,
        &account,
        Some(&registered.registration_record),
        &started.login_request,
        None,
    )?;

    let finished = engine
        .client_finish_login(
            "hunter42",
            &started.client_login_state,
            &server_started.login_response,
            None,
        )?
        .success()
        .expect("login with the registered password succeeds");

    let server_session_key = engine.server_finish_login(
        &server_started.server_login_state,
        &finished.finish_login_request,
    )?;
    assert_eq!(server_session_key, finished.session_key);

    Ok(())
}

fn export_key_stability() -> Result<()> {
    let engine = utils::engine()?;
    let account = utils::tagged("user");
    let registered = utils::register(&engine, &account, "hunter42", None)?;

    let started = engine.client_start_login("hunter42")?;
    let server_started = engine.server_start_login(
        &registered.server_setup,
        &account,
        Some(&registered.registration_record),
        &started.login_request,
        None,
    )?;
    let finished = engine
        .client_finish_login(
            "hunter42",
            &started.client_login_state,
            &server_started.login_response,
            None,
        )?
        .success()
        .expect("login with the registered password succeeds");

    assert_eq!(finished.export_key, registered.export_key);
    assert_eq!(
        finished.server_static_public_key,
        registered.server_static_public_key
    );

    Ok(())
}

fn wrong_password_fails() -> Result<()> {
    let engine = utils::engine()?;
    let registered = utils::register(&engine, "user123", "hunter42", None)?;

    let started = engine.client_start_login("hunter42")?;
    let server_started = engine.server_start_login(
        &registered.server_setup,
        "user123",
        Some(&registered.registration_record),
        &started.login_request,
        None,
    )?;

    let outcome = engine.client_finish_login(
        "hunter23",
        &started.client_login_state,
        &server_started.login_response,
        None,
    )?;
    assert!(outcome.is_failed());

    Ok(())
}

fn mismatched_client_identifier_fails() -> Result<()> {
    let engine = utils::engine()?;
    let identifiers = CustomIdentifiers {
        client: Some("client123".to_string()),
        server: None,
    };
    let registered = utils::register(&engine, "user123", "hunter2", Some(&identifiers))?;

    let started = engine.client_start_login("hunter2")?;
    let server_started = engine.server_start_login(
        &registered.server_setup,
        "user123",
        Some(&registered.registration_record),
        &started.login_request,
        Some(&identifiers),
    )?;

    let outcome = engine.client_finish_login(
        "hunter2",
        &started.client_login_state,
        &server_started.login_response,
        Some(&CustomIdentifiers {
            client: Some("client123abc".to_string()),
            server: None,
        }),
    )?;
    assert!(outcome.is_failed());

    Ok(())
}

fn mismatched_server_identifier_fails() -> Result<()> {
    let engine = utils::engine()?;
    let registration_identifiers = CustomIdentifiers {
        client: None,
        server: Some("server-ident".to_string()),
    };
    let registered =
        utils::register(&engine, "client123", "hunter2", Some(&registration_identifiers))?;

    let started = engine.client_start_login("hunter2")?;
    let server_started = engine.server_start_login(
        &registered.server_setup,
        "client123",
        Some(&registered.registration_record),
        &started.login_request,
        Some(&CustomIdentifiers {
            client: None,
            server: Some("server-ident-abc".to_string()),
        }),
    )?;

    let outcome = engine.client_finish_login(
        "hunter2",
        &started.client_login_state,
        &server_started.login_response,
        Some(&registration_identifiers),
    )?;
    assert!(outcome.is_failed());

    Ok(())
}

fn unknown_account_dummy_path() -> Result<()> {
    let engine = utils::engine()?;
    let server_setup = engine.create_server_setup()?;

    let started = engine.client_start_login("hunter2")?;
    let server_started = engine.server_start_login(
        &server_setup,
        "user1",
        None,
        &started.login_request,
        None,
    )?;
    assert!(!server_started.login_response.is_empty());

    let outcome = engine.client_finish_login(
        "hunter2",
        &started.client_login_state,
        &server_started.login_response,
        None,
    )?;
    assert!(outcome.is_failed());

    Ok(())
}
