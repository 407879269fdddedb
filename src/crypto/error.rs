//! Error types for RSA key handling and OAEP.

/// A key failed validation. Fatal at setup: nothing is measured with it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// The modulus is zero.
    #[error("missing public modulus")]
    MissingModulus,
    /// The public exponent is below 2.
    #[error("public exponent too small")]
    PublicExponentTooSmall,
    /// The public exponent does not fit in 31 bits.
    #[error("public exponent too large")]
    PublicExponentTooLarge,
    /// Fewer than two prime factors were supplied.
    #[error("a private key needs at least two primes, got {0}")]
    TooFewPrimes(usize),
    /// A prime factor is at most 1.
    #[error("invalid prime value")]
    InvalidPrime,
    /// The primes do not multiply to the modulus.
    #[error("invalid modulus")]
    InvalidModulus,
    /// `d * e` is not 1 modulo `p - 1` for some prime `p`.
    #[error("invalid exponents")]
    InvalidExponents,
    /// A value needed for the key has no modular inverse.
    #[error("value is not invertible")]
    NotInvertible,
}

/// Failure of an RSA-OAEP operation.
///
/// Decryption failures are deliberately undifferentiated: every way a
/// ciphertext can be rejected maps to [`RsaError::Decryption`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RsaError {
    /// The ciphertext could not be decrypted.
    #[error("decryption error")]
    Decryption,
    /// The message does not fit under the key's modulus with OAEP padding.
    #[error("message too long for RSA public key size")]
    MessageTooLong,
    /// A signature or fault check failed.
    #[error("verification error")]
    Verification,
    /// The key is malformed.
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Why the private-key path rejected an input. Internal only.
///
/// The workload generator reads this to label inputs by the code path they
/// actually take; the public API collapses it to [`RsaError::Decryption`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PrivateOpError {
    /// The ciphertext integer is not below the modulus.
    ValueTooLarge,
    /// Re-encrypting the private-key result did not give back the input.
    Verification,
    /// OAEP structure check failed (length or padding).
    Decryption,
}

impl From<PrivateOpError> for RsaError {
    fn from(_: PrivateOpError) -> Self {
        RsaError::Decryption
    }
}
