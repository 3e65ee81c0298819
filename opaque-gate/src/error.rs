//! Error taxonomy for the protocol engine.
//!
//! Errors fall into three non-overlapping tiers:
//!
//! 1. Caller-input errors ([`OpaqueGateError::Input`],
//!    [`OpaqueGateError::NotInitialized`]) are raised before any cryptographic
//!    work happens.
//! 2. Malformed-transport errors ([`OpaqueGateError::Base64`],
//!    [`OpaqueGateError::Protocol`]) indicate corruption or a broken
//!    counterpart. Their message shapes are fixed; the protocol variant is
//!    deliberately uninformative so that structural details never leak to an
//!    attacker.
//! 3. Semantic failures (wrong password, tampered response, identifier
//!    mismatch) are *not* errors. They surface as
//!    [`LoginOutcome::Failed`](crate::types::login::client::LoginOutcome) from
//!    the client login finish step.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpaqueGateError>;

#[derive(Debug, Error)]
pub enum OpaqueGateError {
    /// The engine has not reached the `Ready` lifecycle state.
    #[error("engine is not initialized")]
    NotInitialized,

    /// A caller-supplied value was rejected before any cryptographic work.
    #[error("invalid input: {0}")]
    Input(String),

    /// Transport text for `field` was not valid base64.
    #[error("base64 decoding failed at \"{field}\"; {error}")]
    Base64 {
        field: &'static str,
        error: base64::DecodeError,
    },

    /// Decoded bytes did not parse as the expected protocol value, or a
    /// protocol step failed internally. The rendered reason is fixed.
    #[error("opaque protocol error at \"{context}\"; Internal error encountered")]
    Protocol {
        context: String,
        error: opaque_ke::errors::ProtocolError,
    },

    // Wrapped errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl OpaqueGateError {
    /// Structural failure while turning decoded bytes back into a protocol
    /// value. The context names the offending field.
    pub(crate) fn deserialize(
        field: &'static str,
        error: opaque_ke::errors::ProtocolError,
    ) -> Self {
        Self::Protocol {
            context: format!("deserialize {field}"),
            error,
        }
    }

    /// Protocol failure inside an operation that is not a decode step.
    pub(crate) fn protocol(
        context: impl Into<String>,
        error: opaque_ke::errors::ProtocolError,
    ) -> Self {
        Self::Protocol {
            context: context.into(),
            error,
        }
    }
}
