//! Capability interface over the operation surface.
//!
//! Exactly one implementation is selected at startup from the configuration;
//! callers never pick an implementation by runtime type inspection. The
//! in-process implementation below runs the flows directly on top of the
//! primitives library; alternative implementations (for example one backed
//! by a platform-native module) plug in behind the same trait.

use std::str::FromStr;

use rand::rngs::OsRng;

use crate::{
    client,
    error::Result,
    identity::CustomIdentifiers,
    server,
    types::{login, registration, AccountName, Password},
};

/// The full operation surface of the protocol engine.
///
/// Every method is a synchronous, deterministic function of its inputs plus,
/// for the start/create operations, an internal secure-random draw. All
/// multi-byte fields cross this boundary as transport-encoded strings.
pub trait Provider: Send + Sync {
    fn create_server_setup(&self) -> Result<String>;

    fn get_server_public_key(&self, server_setup: &str) -> Result<String>;

    fn client_start_registration(
        &self,
        password: &str,
    ) -> Result<registration::client::RegistrationStarted>;

    fn server_create_registration_response(
        &self,
        server_setup: &str,
        account_identifier: &str,
        registration_request: &str,
    ) -> Result<String>;

    fn client_finish_registration(
        &self,
        password: &str,
        client_registration_state: &str,
        registration_response: &str,
        identifiers: Option<&CustomIdentifiers>,
    ) -> Result<registration::client::RegistrationFinished>;

    fn server_finish_registration(&self, registration_record: &str) -> Result<String>;

    fn client_start_login(&self, password: &str) -> Result<login::client::LoginStarted>;

    fn server_start_login(
        &self,
        server_setup: &str,
        account_identifier: &str,
        registration_record: Option<&str>,
        login_request: &str,
        identifiers: Option<&CustomIdentifiers>,
    ) -> Result<login::server::LoginStarted>;

    fn client_finish_login(
        &self,
        password: &str,
        client_login_state: &str,
        login_response: &str,
        identifiers: Option<&CustomIdentifiers>,
    ) -> Result<login::client::LoginOutcome>;

    fn server_finish_login(
        &self,
        server_login_state: &str,
        finish_login_request: &str,
    ) -> Result<String>;
}

/// Runs every flow in-process on top of the primitives library.
#[derive(Debug, Default)]
pub struct InProcessProvider;

impl InProcessProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Provider for InProcessProvider {
    fn create_server_setup(&self) -> Result<String> {
        Ok(server::setup::create(&mut OsRng))
    }

    fn get_server_public_key(&self, server_setup: &str) -> Result<String> {
        server::setup::public_key(server_setup)
    }

    fn client_start_registration(
        &self,
        password: &str,
    ) -> Result<registration::client::RegistrationStarted> {
        let password = Password::from_str(password)?;
        client::registration::start(&mut OsRng, &password)
    }

    fn server_create_registration_response(
        &self,
        server_setup: &str,
        account_identifier: &str,
        registration_request: &str,
    ) -> Result<String> {
        let account_identifier = AccountName::from_str(account_identifier)?;
        server::registration::create_response(
            server_setup,
            &account_identifier,
            registration_request,
        )
    }

    fn client_finish_registration(
        &self,
        password: &str,
        client_registration_state: &str,
        registration_response: &str,
        identifiers: Option<&CustomIdentifiers>,
    ) -> Result<registration::client::RegistrationFinished> {
        let password = Password::from_str(password)?;
        client::registration::finish(
            &mut OsRng,
            &password,
            client_registration_state,
            registration_response,
            identifiers,
        )
    }

    fn server_finish_registration(&self, registration_record: &str) -> Result<String> {
        server::registration::finish(registration_record)
    }

    fn client_start_login(&self, password: &str) -> Result<login::client::LoginStarted> {
        let password = Password::from_str(password)?;
        client::login::start(&mut OsRng, &password)
    }

    fn server_start_login(
        &self,
        server_setup: &str,
        account_identifier: &str,
        registration_record: Option<&str>,
        login_request: &str,
        identifiers: Option<&CustomIdentifiers>,
    ) -> Result<login::server::LoginStarted> {
        let account_identifier = AccountName::from_str(account_identifier)?;
        server::login::start(
            &mut OsRng,
            server_setup,
            &account_identifier,
            registration_record,
            login_request,
            identifiers,
        )
    }

    fn client_finish_login(
        &self,
        password: &str,
        client_login_state: &str,
        login_response: &str,
        identifiers: Option<&CustomIdentifiers>,
    ) -> Result<login::client::LoginOutcome> {
        let password = Password::from_str(password)?;
        client::login::finish(&password, client_login_state, login_response, identifiers)
    }

    fn server_finish_login(
        &self,
        server_login_state: &str,
        finish_login_request: &str,
    ) -> Result<String> {
        server::login::finish(server_login_state, finish_login_request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Registered {
        server_setup: String,
        registration_record: String,
        export_key: String,
        server_static_public_key: String,
    }

    /// Run a full registration for `account_identifier`, returning everything
    /// a later login needs.
    fn register(
        provider: &InProcessProvider,
        account_identifier: &str,
        password: &str,
        identifiers: Option<&CustomIdentifiers>,
    ) -> Registered {
        let server_setup = provider.create_server_setup().unwrap();

        let started = provider.client_start_registration(password).unwrap();
        let registration_response = provider
            .server_create_registration_response(
                &server_setup,
                account_identifier,
                &started.registration_request,
            )
            .unwrap();
        let finished = provider
            .client_finish_registration(
                password,
                &started.client_registration_state,
                &registration_response,
                identifiers,
            )
            .unwrap();

        let registration_record = provider
            .server_finish_registration(&finished.registration_record)
            .unwrap();
        // The validated record is byte-identical to the client upload.
        assert_eq!(registration_record, finished.registration_record);

        Registered {
            server_setup,
            registration_record,
            export_key: finished.export_key,
            server_static_public_key: finished.server_static_public_key,
        }
    }

    #[test]
    fn full_registration_and_login_flow() {
        let provider = InProcessProvider::new();
        let registered = register(&provider, "user123", "hunter42", None);

        let started = provider.client_start_login("hunter42").unwrap();
        let server_started = provider
            .server_start_login(
                &registered.server_setup,
                "user123",
                Some(&registered.registration_record),
                &started.login_request,
                None,
            )
            .unwrap();

        let finished = provider
            .client_finish_login(
                "hunter42",
                &started.client_login_state,
                &server_started.login_response,
                None,
            )
            .unwrap()
            .success()
            .expect("login with the registered password succeeds");

        // Export key and observed server key are stable across registration
        // and login.
        assert_eq!(finished.export_key, registered.export_key);
        assert_eq!(
            finished.server_static_public_key,
            registered.server_static_public_key
        );
        assert_eq!(
            finished.server_static_public_key,
            provider
                .get_server_public_key(&registered.server_setup)
                .unwrap()
        );

        // Both sides derive the same session key.
        let server_session_key = provider
            .server_finish_login(
                &server_started.server_login_state,
                &finished.finish_login_request,
            )
            .unwrap();
        assert_eq!(server_session_key, finished.session_key);
    }

    #[test]
    fn wrong_password_yields_failed_outcome_without_error() {
        let provider = InProcessProvider::new();
        let registered = register(&provider, "user123", "hunter42", None);

        let started = provider.client_start_login("hunter42").unwrap();
        let server_started = provider
            .server_start_login(
                &registered.server_setup,
                "user123",
                Some(&registered.registration_record),
                &started.login_request,
                None,
            )
            .unwrap();

        let outcome = provider
            .client_finish_login(
                "hunter23",
                &started.client_login_state,
                &server_started.login_response,
                None,
            )
            .unwrap();
        assert!(outcome.is_failed());
    }

    #[test]
    fn mismatched_client_identifier_yields_failed_outcome() {
        let provider = InProcessProvider::new();
        let identifiers = CustomIdentifiers {
            client: Some("client123".to_string()),
            server: None,
        };
        let registered = register(&provider, "user123", "hunter2", Some(&identifiers));

        let started = provider.client_start_login("hunter2").unwrap();
        let server_started = provider
            .server_start_login(
                &registered.server_setup,
                "user123",
                Some(&registered.registration_record),
                &started.login_request,
                Some(&identifiers),
            )
            .unwrap();

        let mismatched = CustomIdentifiers {
            client: Some("client123abc".to_string()),
            server: None,
        };
        let outcome = provider
            .client_finish_login(
                "hunter2",
                &started.client_login_state,
                &server_started.login_response,
                Some(&mismatched),
            )
            .unwrap();
        assert!(outcome.is_failed());
    }

    #[test]
    fn mismatched_server_identifier_yields_failed_outcome() {
        let provider = InProcessProvider::new();
        let registration_identifiers = CustomIdentifiers {
            client: None,
            server: Some("server-ident".to_string()),
        };
        let registered = register(
            &provider,
            "client123",
            "hunter2",
            Some(&registration_identifiers),
        );

        let started = provider.client_start_login("hunter2").unwrap();
        let server_started = provider
            .server_start_login(
                &registered.server_setup,
                "client123",
                Some(&registered.registration_record),
                &started.login_request,
                Some(&CustomIdentifiers {
                    client: None,
                    server: Some("server-ident-abc".to_string()),
                }),
            )
            .unwrap();

        let outcome = provider
            .client_finish_login(
                "hunter2",
                &started.client_login_state,
                &server_started.login_response,
                Some(&registration_identifiers),
            )
            .unwrap();
        assert!(outcome.is_failed());
    }

    #[test]
    fn unknown_account_gets_indistinguishable_dummy_response() {
        let provider = InProcessProvider::new();
        let server_setup = provider.create_server_setup().unwrap();

        let started = provider.client_start_login("hunter2").unwrap();
        let server_started = provider
            .server_start_login(&server_setup, "user1", None, &started.login_request, None)
            .unwrap();

        // The response is structurally valid; the client simply ends up with
        // a failed outcome, exactly as with a wrong password.
        assert!(!server_started.login_response.is_empty());
        let outcome = provider
            .client_finish_login(
                "hunter2",
                &started.client_login_state,
                &server_started.login_response,
                None,
            )
            .unwrap();
        assert!(outcome.is_failed());
    }

    #[test]
    fn dummy_response_has_the_same_shape_as_a_real_one() {
        let provider = InProcessProvider::new();
        let registered = register(&provider, "user123", "hunter42", None);

        let started = provider.client_start_login("hunter42").unwrap();
        let real = provider
            .server_start_login(
                &registered.server_setup,
                "user123",
                Some(&registered.registration_record),
                &started.login_request,
                None,
            )
            .unwrap();
        let dummy = provider
            .server_start_login(
                &registered.server_setup,
                "user1",
                None,
                &started.login_request,
                None,
            )
            .unwrap();

        assert_eq!(real.login_response.len(), dummy.login_response.len());
    }

    #[test]
    fn oversized_password_is_an_input_error() {
        let provider = InProcessProvider::new();
        let oversized = "p".repeat(usize::from(u16::MAX) + 1);
        let error = provider.client_start_registration(&oversized).unwrap_err();
        assert!(matches!(error, crate::OpaqueGateError::Input(_)));
    }
}
