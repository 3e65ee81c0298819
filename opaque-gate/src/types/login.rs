//! Payloads produced by the login operations.

pub mod client {
    use serde::{Deserialize, Serialize};

    /// Output of the login start step.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(deny_unknown_fields, rename_all = "camelCase")]
    pub struct LoginStarted {
        pub client_login_state: String,
        pub login_request: String,
    }

    /// Payload of a successful login finish step.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(deny_unknown_fields, rename_all = "camelCase")]
    pub struct LoginFinished {
        pub finish_login_request: String,
        pub session_key: String,
        pub export_key: String,
        pub server_static_public_key: String,
    }

    /// Outcome of the login finish step.
    ///
    /// A failed login is an ordinary value, not an error: a wrong password, a
    /// tampered response, and mismatched identifiers all surface as
    /// [`LoginOutcome::Failed`] and must stay indistinguishable from one
    /// another. Structural errors on the inputs are reported through the
    /// error channel instead and never end up here.
    #[derive(Debug)]
    pub enum LoginOutcome {
        Success(LoginFinished),
        Failed,
    }

    impl LoginOutcome {
        /// The successful payload, if there is one.
        pub fn success(self) -> Option<LoginFinished> {
            match self {
                LoginOutcome::Success(finished) => Some(finished),
                LoginOutcome::Failed => None,
            }
        }

        pub fn is_failed(&self) -> bool {
            matches!(self, LoginOutcome::Failed)
        }
    }
}

pub mod server {
    use serde::{Deserialize, Serialize};

    /// Output of the server login start step. The response is shaped
    /// identically whether or not a registration record existed.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(deny_unknown_fields, rename_all = "camelCase")]
    pub struct LoginStarted {
        pub server_login_state: String,
        pub login_response: String,
    }
}
