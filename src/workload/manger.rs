//! Manger-style probing of OAEP decryption.
//!
//! Class 0 is a ciphertext whose integer is at least `N`, which decryption
//! rejects before any exponentiation. Class 1 is a fresh OAEP encryption
//! that runs the whole private-key operation and decoding. A decryptor
//! that leaks the difference hands an attacker Manger's oracle.

use std::fmt;

use ctprobe_core::Class;
use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{Labeled, Workload};
use crate::crypto::rsa::random_at_least;
use crate::crypto::{OaepOracle, Probe, RsaError};
use crate::error::Error;
use crate::measurement::black_box;

pub struct MangerWorkload<D = Sha256> {
    oracle: OaepOracle<D>,
    rng: StdRng,
    message_len: usize,
    relabeled: u64,
}

impl<D> fmt::Debug for MangerWorkload<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MangerWorkload")
            .field("oracle", &self.oracle)
            .field("message_len", &self.message_len)
            .field("relabeled", &self.relabeled)
            .finish_non_exhaustive()
    }
}

impl<D: Digest> MangerWorkload<D> {
    /// Probe `oracle` with class-1 plaintexts of `message_len` bytes.
    pub fn new(oracle: OaepOracle<D>, rng: StdRng, message_len: usize) -> Result<Self, Error> {
        if message_len > oracle.max_message_len() {
            return Err(RsaError::MessageTooLong.into());
        }
        Ok(Self {
            oracle,
            rng,
            message_len,
            relabeled: 0,
        })
    }

    pub fn oracle(&self) -> &OaepOracle<D> {
        &self.oracle
    }

    /// Inputs whose observed path differed from the requested class.
    pub fn relabeled(&self) -> u64 {
        self.relabeled
    }

    fn modulus(&self) -> &BigUint {
        self.oracle.key().public_key().n()
    }
}

impl<D: Digest> Workload for MangerWorkload<D> {
    type Input = Vec<u8>;

    fn name(&self) -> &'static str {
        "manger"
    }

    fn generate(&mut self, class: Class) -> Result<Labeled<Vec<u8>>, Error> {
        let input = match class {
            Class::Zero => {
                let k = self.oracle.key().public_key().size();
                let n = self.modulus().clone();
                random_at_least(&mut self.rng, &n, k)
            }
            Class::One => {
                let mut msg = vec![0u8; self.message_len];
                self.rng.fill(&mut msg[..]);
                self.oracle.encrypt(&msg)?
            }
        };

        let observed = match self.oracle.probe(&input) {
            Probe::ValueTooLarge => Class::Zero,
            Probe::Rejected | Probe::Accepted => Class::One,
        };
        if observed != class {
            self.relabeled += 1;
            debug!(requested = ?class, ?observed, "input relabeled by observed path");
        }

        Ok(Labeled::new(input, observed))
    }

    fn execute(&mut self, input: &Vec<u8>) {
        black_box(self.oracle.decrypt(input).is_ok());
    }
}
