use argon2::Argon2;
use opaque_ke::{key_exchange::tripledh::TripleDh, CipherSuite, Ristretto255};

/// The fixed cipher suite every flow in this crate runs over.
#[derive(Debug)]
pub struct OpaqueSuite;

impl CipherSuite for OpaqueSuite {
    type OprfCs = Ristretto255;
    type KeGroup = Ristretto255;
    type KeyExchange = TripleDh;
    type Ksf = Argon2<'static>;
}
