//! RSA-OAEP encryption and constant-time decoding (PKCS #1 v2.2, 7.1).
//!
//! The encoded message is `0x00 || maskedSeed || maskedDB` with
//! `DB = lHash || PS || 0x01 || M`. Decoding touches every byte of the
//! padding region and folds all validity conditions into one [`Choice`],
//! so the only branch on secret-derived data is the final accept/reject.

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use sha2::Digest;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use super::error::{PrivateOpError, RsaError};
use super::mgf::mgf1_xor;
use super::pad::left_pad;
use super::rsa::{PrivateKey, PublicKey};

/// Longest message `key` can carry with digest `D`, or `None` if the
/// modulus is too small for OAEP at all.
pub fn max_message_len<D: Digest>(key: &PublicKey) -> Option<usize> {
    let h = <D as Digest>::output_size();
    key.size().checked_sub(2 * h + 2)
}

/// OAEP-encode `msg` under `label` and encrypt it with the public key.
///
/// The result is always exactly `k` bytes long.
pub fn encrypt<D, R>(
    rng: &mut R,
    key: &PublicKey,
    msg: &[u8],
    label: &[u8],
) -> Result<Vec<u8>, RsaError>
where
    D: Digest,
    R: CryptoRng + ?Sized,
{
    key.check()?;
    let k = key.size();
    let h = <D as Digest>::output_size();
    match max_message_len::<D>(key) {
        Some(max) if msg.len() <= max => {}
        _ => return Err(RsaError::MessageTooLong),
    }

    let mut em = vec![0u8; k];
    let (seed, db) = em[1..].split_at_mut(h);
    db[..h].copy_from_slice(&D::digest(label));
    let msg_start = db.len() - msg.len();
    db[msg_start - 1] = 0x01;
    db[msg_start..].copy_from_slice(msg);

    RngCore::fill_bytes(rng, seed);
    mgf1_xor::<D>(db, seed);
    mgf1_xor::<D>(seed, db);

    let c = key.encrypt_raw(&BigUint::from_bytes_be(&em));
    Ok(left_pad(&c.to_bytes_be(), k))
}

/// Decrypt an OAEP ciphertext.
///
/// Every failure past argument parsing is reported as
/// [`RsaError::Decryption`], whatever its cause.
pub fn decrypt<D: Digest>(
    key: &PrivateKey,
    rng: Option<&mut dyn CryptoRng>,
    ciphertext: &[u8],
    label: &[u8],
    check_crt: bool,
) -> Result<Vec<u8>, RsaError> {
    decrypt_inner::<D>(key, rng, ciphertext, label, check_crt).map_err(RsaError::from)
}

pub(crate) fn decrypt_inner<D: Digest>(
    key: &PrivateKey,
    rng: Option<&mut dyn CryptoRng>,
    ciphertext: &[u8],
    label: &[u8],
    check_crt: bool,
) -> Result<Vec<u8>, PrivateOpError> {
    let k = key.public_key().size();
    let h = <D as Digest>::output_size();
    if ciphertext.len() > k || k < 2 * h + 2 {
        return Err(PrivateOpError::Decryption);
    }

    let c = BigUint::from_bytes_be(ciphertext);
    let m = key.private_op(rng, &c, check_crt)?;

    let l_hash = D::digest(label);

    // Unconditional: the padded length must not depend on m's bit length.
    let mut em = left_pad(&m.to_bytes_be(), k);

    let first_byte_is_zero = em[0].ct_eq(&0);

    let (seed, db) = em[1..].split_at_mut(h);
    mgf1_xor::<D>(seed, db);
    mgf1_xor::<D>(db, seed);

    let hash_good = l_hash.as_slice().ct_eq(&db[..h]);

    let rest = &db[h..];
    let (index, looking_for_index, invalid) = scan_padding(rest);

    let valid = first_byte_is_zero & hash_good & !invalid & !looking_for_index;
    if !bool::from(valid) {
        return Err(PrivateOpError::Decryption);
    }

    Ok(rest[index as usize + 1..].to_vec())
}

/// Locate the `0x01` delimiter in `PS || 0x01 || M` without branching.
///
/// Returns the delimiter offset, whether the scan is still looking for it,
/// and whether a non-zero byte preceded it.
fn scan_padding(rest: &[u8]) -> (u32, Choice, Choice) {
    let mut looking_for_index = Choice::from(1);
    let mut index = 0u32;
    let mut invalid = Choice::from(0);

    for (i, byte) in rest.iter().enumerate() {
        let equals0 = byte.ct_eq(&0);
        let equals1 = byte.ct_eq(&1);
        index = u32::conditional_select(&index, &(i as u32), looking_for_index & equals1);
        looking_for_index &= !equals1;
        invalid |= looking_for_index & !equals0;
    }

    (index, looking_for_index, invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::fixture::test_key_2048;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sha2::Sha256;

    #[test]
    fn scan_finds_delimiter_after_zero_run() {
        let (index, looking, invalid) = scan_padding(&[0, 0, 0, 1, 7, 1]);
        assert_eq!(index, 3);
        assert!(!bool::from(looking));
        assert!(!bool::from(invalid));
    }

    #[test]
    fn scan_flags_nonzero_before_delimiter() {
        let (_, looking, invalid) = scan_padding(&[0, 2, 1, 5]);
        assert!(!bool::from(looking));
        assert!(bool::from(invalid));
    }

    #[test]
    fn scan_without_delimiter_keeps_looking() {
        let (_, looking, _) = scan_padding(&[0, 0, 0]);
        assert!(bool::from(looking));
    }

    #[test]
    fn empty_message_round_trips() {
        let key = test_key_2048().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let ct = encrypt::<Sha256, _>(&mut rng, key.public_key(), b"", b"").unwrap();
        assert_eq!(ct.len(), 256);
        assert_eq!(decrypt::<Sha256>(&key, None, &ct, b"", false), Ok(Vec::new()));
    }

    #[test]
    fn message_length_limit() {
        let key = test_key_2048().unwrap();
        let max = max_message_len::<Sha256>(key.public_key()).unwrap();
        assert_eq!(max, 256 - 2 * 32 - 2);

        let mut rng = StdRng::seed_from_u64(2);
        assert!(encrypt::<Sha256, _>(&mut rng, key.public_key(), &vec![7u8; max], b"").is_ok());
        assert_eq!(
            encrypt::<Sha256, _>(&mut rng, key.public_key(), &vec![7u8; max + 1], b""),
            Err(RsaError::MessageTooLong)
        );
    }

    #[test]
    fn wrong_label_is_rejected() {
        let key = test_key_2048().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let ct = encrypt::<Sha256, _>(&mut rng, key.public_key(), b"hello", b"left").unwrap();
        assert_eq!(
            decrypt::<Sha256>(&key, None, &ct, b"right", false),
            Err(RsaError::Decryption)
        );
    }

    #[test]
    fn oversized_ciphertext_is_rejected_before_exponentiation() {
        let key = test_key_2048().unwrap();
        assert_eq!(
            decrypt_inner::<Sha256>(&key, None, &[1u8; 257], b"", false),
            Err(PrivateOpError::Decryption)
        );
    }
}
