//! The OAEP decryption oracle measured by the Manger workload.

use std::fmt;
use std::marker::PhantomData;

use rand::rngs::StdRng;
use rand::CryptoRng;
use sha2::{Digest, Sha256};

use super::error::{KeyError, PrivateOpError, RsaError};
use super::oaep;
use super::rsa::PrivateKey;

/// Which code path a ciphertext took through decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The ciphertext integer was not below the modulus and returned early.
    ValueTooLarge,
    /// Rejected after the private-key operation.
    Rejected,
    /// Decrypted to a valid OAEP message.
    Accepted,
}

/// RSA-OAEP under a fixed key and label, with its own randomness for
/// blinding factors and OAEP seeds.
pub struct OaepOracle<D = Sha256> {
    key: PrivateKey,
    label: Vec<u8>,
    blinding: bool,
    check_crt: bool,
    rng: StdRng,
    _digest: PhantomData<D>,
}

impl<D> fmt::Debug for OaepOracle<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OaepOracle")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("blinding", &self.blinding)
            .field("check_crt", &self.check_crt)
            .finish_non_exhaustive()
    }
}

impl<D: Digest> OaepOracle<D> {
    /// Wrap `key`, precomputing its CRT values. Blinding is on by default.
    pub fn new(mut key: PrivateKey, rng: StdRng) -> Result<Self, KeyError> {
        key.precompute()?;
        Ok(Self {
            key,
            label: Vec::new(),
            blinding: true,
            check_crt: false,
            rng,
            _digest: PhantomData,
        })
    }

    pub fn with_label(mut self, label: impl Into<Vec<u8>>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_blinding(mut self, blinding: bool) -> Self {
        self.blinding = blinding;
        self
    }

    pub fn with_check_crt(mut self, check_crt: bool) -> Self {
        self.check_crt = check_crt;
        self
    }

    pub fn key(&self) -> &PrivateKey {
        &self.key
    }

    pub fn label(&self) -> &[u8] {
        &self.label
    }

    /// Longest plaintext this oracle can encrypt.
    pub fn max_message_len(&self) -> usize {
        oaep::max_message_len::<D>(self.key.public_key()).unwrap_or(0)
    }

    pub fn encrypt(&mut self, msg: &[u8]) -> Result<Vec<u8>, RsaError> {
        oaep::encrypt::<D, _>(&mut self.rng, self.key.public_key(), msg, &self.label)
    }

    /// Decrypt with a single undifferentiated error.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, RsaError> {
        self.decrypt_inner(ciphertext).map_err(RsaError::from)
    }

    /// Decrypt `ciphertext` and report the path it took.
    ///
    /// Used to label inputs, never inside a timed region.
    pub fn probe(&mut self, ciphertext: &[u8]) -> Probe {
        match self.decrypt_inner(ciphertext) {
            Ok(_) => Probe::Accepted,
            Err(PrivateOpError::ValueTooLarge) => Probe::ValueTooLarge,
            Err(PrivateOpError::Decryption | PrivateOpError::Verification) => Probe::Rejected,
        }
    }

    fn decrypt_inner(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, PrivateOpError> {
        let rng = if self.blinding {
            Some(&mut self.rng as &mut dyn CryptoRng)
        } else {
            None
        };
        oaep::decrypt_inner::<D>(&self.key, rng, ciphertext, &self.label, self.check_crt)
    }
}
