//! Fixed-width left padding.

use subtle::{Choice, ConditionallySelectable};

/// Right-align `input` in a zeroed buffer of exactly `size` bytes.
///
/// Runs unconditionally, even when `input` already has `size` bytes, so the
/// output length never reveals how many leading zero bytes the value had.
/// Inputs longer than `size` keep their first `size` bytes.
pub fn left_pad(input: &[u8], size: usize) -> Vec<u8> {
    let n = input.len().min(size);
    let mut out = vec![0u8; size];
    out[size - n..].copy_from_slice(&input[..n]);
    out
}

/// [`left_pad`] with the copy done through masked byte selects.
///
/// The copy loop still runs once per input byte, so the work depends on
/// `input.len()` exactly as in [`left_pad`]. Only the bulk copy is replaced.
pub fn left_pad_masked(input: &[u8], size: usize) -> Vec<u8> {
    let n = input.len().min(size);
    let mut out = vec![0u8; size];
    let copy = Choice::from(1);
    for (dst, src) in out[size - n..].iter_mut().zip(input) {
        dst.conditional_assign(src, copy);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_short_input() {
        assert_eq!(left_pad(&[1, 2], 4), vec![0, 0, 1, 2]);
    }

    #[test]
    fn full_width_input_is_copied() {
        assert_eq!(left_pad(&[9, 8, 7], 3), vec![9, 8, 7]);
    }

    #[test]
    fn long_input_is_truncated() {
        assert_eq!(left_pad(&[1, 2, 3, 4], 2), vec![1, 2]);
        assert!(left_pad(&[], 0).is_empty());
    }

    #[test]
    fn masked_pad_agrees_with_plain_pad() {
        let input: Vec<u8> = (1..=9).collect();
        for len in 0..=input.len() {
            for size in [0, 1, 4, 9, 12] {
                assert_eq!(
                    left_pad_masked(&input[..len], size),
                    left_pad(&input[..len], size),
                    "len {len}, size {size}"
                );
            }
        }
    }
}
