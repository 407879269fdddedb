//! The subject under test: RSA with CRT and blinding, and OAEP.

pub mod error;
pub mod fixture;
pub mod mgf;
pub mod oaep;
pub mod oracle;
pub mod pad;
pub mod rsa;

pub use error::{KeyError, RsaError};
pub use oracle::{OaepOracle, Probe};
pub use rsa::{PrivateKey, PublicKey};
