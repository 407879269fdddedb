//! RSA key material and the private-key operation.
//!
//! The private operation runs through the Chinese remainder theorem when
//! precomputed values are present: one exponentiation per prime, recombined
//! with Garner's formula. The first two primes are combined the PKCS #1 way
//! (with `Qinv`); every further prime carries its own [`CrtValue`]. For the
//! usual two-prime key the extra loop never runs.
//!
//! Blinding multiplies the ciphertext by `r^e` for a fresh random `r` before
//! exponentiating and strips `r` afterwards, so exponentiation timing no
//! longer correlates with the ciphertext.

use std::fmt;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

use super::error::{KeyError, PrivateOpError, RsaError};
use super::pad::left_pad;

/// Largest accepted public exponent. Keeps `e` in 31 bits on every platform.
pub const MAX_PUBLIC_EXPONENT: u64 = (1 << 31) - 1;

/// The public half of an RSA key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    n: BigUint,
    e: u64,
}

impl PublicKey {
    /// Build a public key, checking the modulus and exponent.
    pub fn new(n: BigUint, e: u64) -> Result<Self, KeyError> {
        let key = Self { n, e };
        key.check()?;
        Ok(key)
    }

    /// Sanity-check the modulus and exponent.
    pub fn check(&self) -> Result<(), KeyError> {
        if self.n.is_zero() {
            return Err(KeyError::MissingModulus);
        }
        if self.e < 2 {
            return Err(KeyError::PublicExponentTooSmall);
        }
        if self.e > MAX_PUBLIC_EXPONENT {
            return Err(KeyError::PublicExponentTooLarge);
        }
        Ok(())
    }

    /// The modulus `N`.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// The public exponent `E`.
    pub fn e(&self) -> u64 {
        self.e
    }

    /// Modulus length in bytes, `k`.
    pub fn size(&self) -> usize {
        (self.n.bits() as usize + 7) / 8
    }

    /// `m^e mod N`.
    pub fn encrypt_raw(&self, m: &BigUint) -> BigUint {
        m.modpow(&BigUint::from(self.e), &self.n)
    }
}

/// CRT values for the third and later primes.
#[derive(Clone, PartialEq, Eq)]
pub struct CrtValue {
    /// `D mod (prime - 1)`.
    exp: BigUint,
    /// `r^-1 mod prime`.
    coeff: BigUint,
    /// Product of the primes before this one.
    r: BigUint,
}

/// Values that speed up the private operation.
#[derive(Clone, PartialEq, Eq)]
pub struct Precomputed {
    dp: BigUint,
    dq: BigUint,
    qinv: BigUint,
    crt_values: Vec<CrtValue>,
}

impl Precomputed {
    /// Extra CRT values, one per prime beyond the first two.
    pub fn crt_values(&self) -> &[CrtValue] {
        &self.crt_values
    }
}

/// An RSA private key with two or more prime factors.
///
/// Keys can only be built through validating constructors, so a
/// `PrivateKey` in hand always satisfies `prod(primes) = N` and
/// `D * E = 1 mod (p - 1)` for every prime.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    public: PublicKey,
    d: BigUint,
    primes: Vec<BigUint>,
    precomputed: Option<Precomputed>,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public", &self.public)
            .field("primes", &self.primes.len())
            .field("precomputed", &self.precomputed.is_some())
            .finish_non_exhaustive()
    }
}

impl PrivateKey {
    /// Assemble a key from its components and validate it.
    pub fn from_components(
        n: BigUint,
        e: u64,
        d: BigUint,
        primes: Vec<BigUint>,
    ) -> Result<Self, KeyError> {
        let key = Self {
            public: PublicKey { n, e },
            d,
            primes,
            precomputed: None,
        };
        key.validate()?;
        Ok(key)
    }

    /// Derive `N` and `D = E^-1 mod lcm(p_i - 1)` from the primes.
    pub fn from_primes(primes: Vec<BigUint>, e: u64) -> Result<Self, KeyError> {
        if primes.len() < 2 {
            return Err(KeyError::TooFewPrimes(primes.len()));
        }
        if primes.iter().any(|p| *p <= BigUint::one()) {
            return Err(KeyError::InvalidPrime);
        }

        let n = primes.iter().fold(BigUint::one(), |acc, p| acc * p);
        let lambda = primes
            .iter()
            .fold(BigUint::one(), |acc, p| acc.lcm(&(p - 1u32)));
        let d = BigUint::from(e)
            .modinv(&lambda)
            .ok_or(KeyError::NotInvertible)?;

        Self::from_components(n, e, d, primes)
    }

    /// The public half.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// The prime factors of `N`.
    pub fn primes(&self) -> &[BigUint] {
        &self.primes
    }

    /// Precomputed CRT values, if [`precompute`](Self::precompute) ran.
    pub fn precomputed(&self) -> Option<&Precomputed> {
        self.precomputed.as_ref()
    }

    /// Check the key's internal consistency.
    pub fn validate(&self) -> Result<(), KeyError> {
        self.public.check()?;

        if self.primes.len() < 2 {
            return Err(KeyError::TooFewPrimes(self.primes.len()));
        }

        let mut modulus = BigUint::one();
        for prime in &self.primes {
            // Primes <= 1 would divide by zero further down.
            if *prime <= BigUint::one() {
                return Err(KeyError::InvalidPrime);
            }
            modulus *= prime;
        }
        if modulus != self.public.n {
            return Err(KeyError::InvalidModulus);
        }

        // de = 1 mod p-1 for every prime implies a^de = a mod N.
        let de = &self.d * self.public.e;
        for prime in &self.primes {
            if !(&de % (prime - 1u32)).is_one() {
                return Err(KeyError::InvalidExponents);
            }
        }
        Ok(())
    }

    /// Compute the CRT values. Does nothing if they already exist.
    pub fn precompute(&mut self) -> Result<(), KeyError> {
        if self.precomputed.is_some() {
            return Ok(());
        }

        let p = &self.primes[0];
        let q = &self.primes[1];
        let dp = &self.d % (p - 1u32);
        let dq = &self.d % (q - 1u32);
        let qinv = q.modinv(p).ok_or(KeyError::NotInvertible)?;

        let mut r = p * q;
        let mut crt_values = Vec::with_capacity(self.primes.len() - 2);
        for prime in &self.primes[2..] {
            crt_values.push(CrtValue {
                exp: &self.d % (prime - 1u32),
                coeff: r.modinv(prime).ok_or(KeyError::NotInvertible)?,
                r: r.clone(),
            });
            r *= prime;
        }

        self.precomputed = Some(Precomputed {
            dp,
            dq,
            qinv,
            crt_values,
        });
        Ok(())
    }

    /// Raw RSA decryption `c^D mod N`, blinded when `rng` is given.
    ///
    /// With `check`, the result is re-encrypted and compared with the input
    /// to catch faulty CRT arithmetic.
    pub fn decrypt_raw(
        &self,
        rng: Option<&mut dyn CryptoRng>,
        c: &BigUint,
        check: bool,
    ) -> Result<BigUint, RsaError> {
        self.private_op(rng, c, check).map_err(|err| match err {
            PrivateOpError::Verification => RsaError::Verification,
            PrivateOpError::ValueTooLarge | PrivateOpError::Decryption => RsaError::Decryption,
        })
    }

    /// The private-key operation with its internal failure reasons.
    ///
    /// The range check on `c` returns early and is not constant-time: it is
    /// exactly the behavior a Manger probe tries to observe.
    pub(crate) fn private_op(
        &self,
        rng: Option<&mut dyn CryptoRng>,
        c: &BigUint,
        check: bool,
    ) -> Result<BigUint, PrivateOpError> {
        let n = &self.public.n;
        if c >= n {
            return Err(PrivateOpError::ValueTooLarge);
        }

        let blinded;
        let (c, unblind) = match rng {
            Some(rng) => {
                let (r, r_inv) = blinding_factor(rng, n);
                blinded = (c * self.public.encrypt_raw(&r)) % n;
                (&blinded, Some(r_inv))
            }
            None => (c, None),
        };

        let mut m = match &self.precomputed {
            Some(pre) => self.crt(c, pre),
            None => c.modpow(&self.d, n),
        };

        if check && self.public.encrypt_raw(&m) != *c {
            return Err(PrivateOpError::Verification);
        }

        if let Some(r_inv) = unblind {
            m = (m * r_inv) % n;
        }
        Ok(m)
    }

    fn crt(&self, c: &BigUint, pre: &Precomputed) -> BigUint {
        let p = &self.primes[0];
        let q = &self.primes[1];

        let m1 = c.modpow(&pre.dp, p);
        let m2 = c.modpow(&pre.dq, q);
        let h = ((m1 + p - (&m2 % p)) * &pre.qinv) % p;
        let mut m = h * q + &m2;

        for (prime, values) in self.primes[2..].iter().zip(&pre.crt_values) {
            let mi = c.modpow(&values.exp, prime);
            let h = ((mi + prime - (&m % prime)) * &values.coeff) % prime;
            m += h * &values.r;
        }
        m
    }
}

/// Draw `r` uniformly below `n` with an inverse mod `n`; zero becomes one.
fn blinding_factor<R: RngCore + ?Sized>(rng: &mut R, n: &BigUint) -> (BigUint, BigUint) {
    loop {
        let mut r = random_below(rng, n);
        if r.is_zero() {
            r = BigUint::one();
        }
        if let Some(r_inv) = r.modinv(n) {
            return (r, r_inv);
        }
    }
}

/// Uniform integer in `[0, bound)` by rejection sampling.
pub(crate) fn random_below<R: RngCore + ?Sized>(rng: &mut R, bound: &BigUint) -> BigUint {
    let bits = bound.bits();
    let len = ((bits + 7) / 8) as usize;
    let excess = (len as u64 * 8 - bits) as u32;
    let mut buf = vec![0u8; len];
    loop {
        rng.fill_bytes(&mut buf);
        if let Some(top) = buf.first_mut() {
            *top &= 0xff >> excess;
        }
        let r = BigUint::from_bytes_be(&buf);
        if r < *bound {
            return r;
        }
    }
}

/// Uniform `len`-byte integer in `[floor, 2^(8 * len))`.
///
/// Draws an offset below the width of that range, so the cost does not
/// depend on how close `floor` sits to the top.
///
/// # Panics
///
/// Panics if `floor` is not below `2^(8 * len)`.
pub(crate) fn random_at_least<R: RngCore + ?Sized>(
    rng: &mut R,
    floor: &BigUint,
    len: usize,
) -> Vec<u8> {
    let top = BigUint::one() << (8 * len);
    assert!(*floor < top, "floor must fit in {len} bytes");
    let v = floor + random_below(rng, &(top - floor));
    left_pad(&v.to_bytes_be(), len)
}
