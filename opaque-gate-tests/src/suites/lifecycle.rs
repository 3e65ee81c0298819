use anyhow::Result;
use opaque_gate::{
    config::Config,
    engine::{Engine, Status},
    OpaqueGateError,
};

use crate::runner::TestCase;

pub fn cases() -> Vec<TestCase> {
    vec![
        TestCase {
            name: "operations fail fast before initialization",
            run: fail_fast_before_initialization,
        },
        TestCase {
            name: "initialization moves the engine to ready",
            run: initialization_reaches_ready,
        },
        TestCase {
            name: "a ready engine cannot be reinitialized",
            run: ready_engine_rejects_reinitialization,
        },
    ]
}

fn fail_fast_before_initialization() -> Result<()> {
    let engine = Engine::new();
    assert_eq!(engine.status(), Status::Uninitialized);

    let error = engine.create_server_setup().unwrap_err();
    assert!(matches!(error, OpaqueGateError::NotInitialized));
    let error = engine.client_start_login("hunter2").unwrap_err();
    assert!(matches!(error, OpaqueGateError::NotInitialized));

    Ok(())
}

fn initialization_reaches_ready() -> Result<()> {
    let engine = Engine::new();
    engine.initialize(&Config::default())?;
    assert_eq!(engine.status(), Status::Ready);

    let server_setup = engine.create_server_setup()?;
    assert!(!server_setup.is_empty());

    Ok(())
}

fn ready_engine_rejects_reinitialization() -> Result<()> {
    let engine = Engine::new();
    engine.initialize(&Config::default())?;

    let error = engine.initialize(&Config::default()).unwrap_err();
    assert!(matches!(error, OpaqueGateError::Input(_)));
    assert_eq!(engine.status(), Status::Ready);

    Ok(())
}
