//! MGF1 mask generation (PKCS #1 v2.2, appendix B.2.1).

use sha2::Digest;

/// XOR `out` in place with the MGF1 mask derived from `seed`.
///
/// The mask is `H(seed || C)` for a big-endian 32-bit counter `C` starting
/// at zero, concatenated until it covers `out`.
pub fn mgf1_xor<D: Digest>(out: &mut [u8], seed: &[u8]) {
    let mut counter: u32 = 0;
    for chunk in out.chunks_mut(<D as Digest>::output_size()) {
        let mut hasher = D::new();
        hasher.update(seed);
        hasher.update(counter.to_be_bytes());
        let digest = hasher.finalize();

        for (byte, mask) in chunk.iter_mut().zip(digest.iter()) {
            *byte ^= mask;
        }
        counter = counter.wrapping_add(1);
    }
}
