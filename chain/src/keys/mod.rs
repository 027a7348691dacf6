//! Actor key registry: RSA-2048 keypair generation, signing, and
//! verification over the canonical signed form of a transaction.
//!
//! Grounded on the "generate on demand, persist to PEM, sign/verify with
//! PKCS1v1.5-over-SHA256" shape of the original `CryptoManager`.

pub mod registry;

pub use registry::{KeyError, KeyRegistry};
