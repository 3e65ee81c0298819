//! Payloads produced by the registration operations. Field names match the
//! canonical protocol field names used in error contexts.

pub mod client {
    use serde::{Deserialize, Serialize};

    /// Output of the registration start step: the blinded request to forward
    /// to the server and the state to hold for the finish step.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(deny_unknown_fields, rename_all = "camelCase")]
    pub struct RegistrationStarted {
        pub client_registration_state: String,
        pub registration_request: String,
    }

    /// Output of the registration finish step. The registration record is
    /// directly storable by the server; the export key never leaves the
    /// client.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(deny_unknown_fields, rename_all = "camelCase")]
    pub struct RegistrationFinished {
        pub registration_record: String,
        pub export_key: String,
        pub server_static_public_key: String,
    }
}
