//! Long-term server key material: a static asymmetric keypair plus the OPRF
//! seed from which every account's OPRF key is derived. Created once per
//! deployment and persisted by the caller.

use opaque_ke::ServerSetup;
use rand::{CryptoRng, RngCore};
use tracing::instrument;

use crate::{codec, config::suite::OpaqueSuite, error::Result};

/// Create a fresh server setup from a secure random source.
#[instrument(skip_all)]
pub fn create(rng: &mut (impl CryptoRng + RngCore)) -> String {
    codec::encode(ServerSetup::<OpaqueSuite>::new(rng).serialize())
}

/// Project the static public key out of a serialized setup. Pure and
/// deterministic: repeated calls on the same setup return identical output.
pub fn public_key(server_setup: &str) -> Result<String> {
    let setup = codec::server_setup("serverSetup", server_setup)?;
    Ok(codec::encode(setup.keypair().public().serialize()))
}
