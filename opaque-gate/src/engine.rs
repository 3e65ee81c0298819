//! Lifecycle-gated front door for the operation surface.
//!
//! An [`Engine`] starts out `Uninitialized` and must be moved to `Ready` by
//! [`Engine::initialize`] before any protocol operation runs. Operations on
//! an engine that is not ready fail fast with
//! [`OpaqueGateError::NotInitialized`] instead of racing a half-loaded
//! provider.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use strum::Display;
use tracing::{info, instrument};

use crate::{
    config::{Config, ProviderKind},
    error::{OpaqueGateError, Result},
    identity::CustomIdentifiers,
    provider::{InProcessProvider, Provider},
    types::{login, registration},
};

/// Externally observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Status {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

enum Lifecycle {
    Uninitialized,
    Loading,
    Ready(Arc<dyn Provider>),
    Failed(String),
}

/// Front door for every protocol operation.
///
/// The lifecycle cell is the only synchronized datum in the crate; it is
/// write-touched during initialization and read-only afterwards, so an
/// engine may serve unlimited concurrent flows.
pub struct Engine {
    lifecycle: RwLock<Lifecycle>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            lifecycle: RwLock::new(Lifecycle::Uninitialized),
        }
    }

    /// Load the provider named by `config` and move to `Ready`.
    ///
    /// Permitted from `Uninitialized` and `Failed`; re-initializing a ready
    /// engine is a caller error.
    #[instrument(skip_all)]
    pub fn initialize(&self, config: &Config) -> Result<()> {
        {
            let mut lifecycle = self.write();
            match *lifecycle {
                Lifecycle::Ready(_) => {
                    return Err(OpaqueGateError::Input(
                        "engine is already initialized".to_string(),
                    ))
                }
                Lifecycle::Loading => {
                    return Err(OpaqueGateError::Input(
                        "engine is already loading".to_string(),
                    ))
                }
                Lifecycle::Uninitialized | Lifecycle::Failed(_) => {
                    *lifecycle = Lifecycle::Loading;
                }
            }
        }

        info!(provider = %config.provider, "initializing protocol engine");
        match load_provider(config) {
            Ok(provider) => {
                *self.write() = Lifecycle::Ready(provider);
                Ok(())
            }
            Err(error) => {
                *self.write() = Lifecycle::Failed(error.to_string());
                Err(error)
            }
        }
    }

    pub fn status(&self) -> Status {
        match *self.read() {
            Lifecycle::Uninitialized => Status::Uninitialized,
            Lifecycle::Loading => Status::Loading,
            Lifecycle::Ready(_) => Status::Ready,
            Lifecycle::Failed(_) => Status::Failed,
        }
    }

    /// The message from the initialization attempt that moved the engine to
    /// `Failed`, if that is where it is.
    pub fn failure_reason(&self) -> Option<String> {
        match &*self.read() {
            Lifecycle::Failed(reason) => Some(reason.clone()),
            _ => None,
        }
    }

    fn provider(&self) -> Result<Arc<dyn Provider>> {
        match &*self.read() {
            Lifecycle::Ready(provider) => Ok(provider.clone()),
            _ => Err(OpaqueGateError::NotInitialized),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Lifecycle> {
        self.lifecycle.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Lifecycle> {
        self.lifecycle
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_server_setup(&self) -> Result<String> {
        self.provider()?.create_server_setup()
    }

    pub fn get_server_public_key(&self, server_setup: &str) -> Result<String> {
        self.provider()?.get_server_public_key(server_setup)
    }

    pub fn client_start_registration(
        &self,
        password: &str,
    ) -> Result<registration::client::RegistrationStarted> {
        self.provider()?.client_start_registration(password)
    }

    pub fn server_create_registration_response(
        &self,
        server_setup: &str,
        account_identifier: &str,
        registration_request: &str,
    ) -> Result<String> {
        self.provider()?.server_create_registration_response(
            server_setup,
            account_identifier,
            registration_request,
        )
    }

    pub fn client_finish_registration(
        &self,
        password: &str,
        client_registration_state: &str,
        registration_response: &str,
        identifiers: Option<&CustomIdentifiers>,
    ) -> Result<registration::client::RegistrationFinished> {
        self.provider()?.client_finish_registration(
            password,
            client_registration_state,
            registration_response,
            identifiers,
        )
    }

    pub fn server_finish_registration(&self, registration_record: &str) -> Result<String> {
        self.provider()?.server_finish_registration(registration_record)
    }

    pub fn client_start_login(&self, password: &str) -> Result<login::client::LoginStarted> {
        self.provider()?.client_start_login(password)
    }

    pub fn server_start_login(
        &self,
        server_setup: &str,
        account_identifier: &str,
        registration_record: Option<&str>,
        login_request: &str,
        identifiers: Option<&CustomIdentifiers>,
    ) -> Result<login::server::LoginStarted> {
        self.provider()?.server_start_login(
            server_setup,
            account_identifier,
            registration_record,
            login_request,
            identifiers,
        )
    }

    pub fn client_finish_login(
        &self,
        password: &str,
        client_login_state: &str,
        login_response: &str,
        identifiers: Option<&CustomIdentifiers>,
    ) -> Result<login::client::LoginOutcome> {
        self.provider()?.client_finish_login(
            password,
            client_login_state,
            login_response,
            identifiers,
        )
    }

    pub fn server_finish_login(
        &self,
        server_login_state: &str,
        finish_login_request: &str,
    ) -> Result<String> {
        self.provider()?
            .server_finish_login(server_login_state, finish_login_request)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn load_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    match config.provider {
        ProviderKind::InProcess => Ok(Arc::new(InProcessProvider::new())),
    }
}
