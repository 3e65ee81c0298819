//! Protocol orchestration for password-authenticated key exchange.
//!
//! This crate sequences the registration and login flows of an OPAQUE
//! deployment: it threads opaque state blobs across an untrusted transport,
//! binds client and server identities into the key-exchange transcript, and
//! enforces the failure-shape discipline that keeps wrong passwords, unknown
//! accounts, and identifier mismatches indistinguishable from the outside.
//! The group arithmetic, OPRF evaluation, and key derivation are supplied by
//! the `opaque-ke` primitives library; transport and persistence belong to
//! the caller.
#![warn(unused_results)]
#![warn(future_incompatible)]
#![warn(unused)]
#![forbid(rustdoc::broken_intra_doc_links)]

pub mod client;
pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod identity;
pub mod provider;
pub mod server;
pub mod types;

pub use engine::Engine;
pub use error::{OpaqueGateError, Result};
