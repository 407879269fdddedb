//! Fixed RSA test key used as the default measurement subject.

use num_bigint::BigUint;

use super::error::KeyError;
use super::rsa::PrivateKey;

/// Public exponent of [`test_key_2048`].
pub const TEST_KEY_EXPONENT: u64 = 17;

const MODULUS: &[&str] = &[
    "b3a6b8dac202f283b94ed148cf5eedd6a9990ee2cc42e9955c5b06ec40c23a20",
    "5de3c0ed7f0fbc29b3d38cdffc9129f2e8b2f54a0df471e7f27c0f2eac1298b6",
    "8a802ae1f2dccf2ebae134b4cbc3866b3b1e65b44ab541b80609a62c09322e46",
    "e5e1ff3e05eb2af7ca5f4df2c62f3107d4647bee1a77d3f5c787c583ee834b25",
    "bbb0fcbb4ed9e97cef8e8f2b8f947ebdefda9c1e0af23ac7b2445ba3b3d483a7",
    "6f007fca88cd1f13b2f85b1d435c3000bd1d6fa245489c6239e8b1b6648dcbcb",
    "2463589f76df043188e84cb458858ed1f1de3ae89025111854602d9bd6cc6da5",
    "369e9c7c32430d25129f23ce37d281883f4de1bd5787d52815c13c2009829fdd",
];

const PRIVATE_EXPONENT: &[&str] = &[
    "3f680501ea1f286ab9df9528c1a908a61dbd8cc88453d9f87af2f36271357ded",
    "4e506235b45fe80eb7f04fd6956069288e5d47838c74646ffb3ad82e97159f4f",
    "7c2d3c4fbf20c19805b8e56cfc9f5c9e5119c98aed30ea04b6d63aa6215d0146",
    "330478340216c3defc21a30a6410a7e4a550a435eb3959de466c2797f9d3fc67",
    "1416ef3451c534b74e2793f123adba26ebfd2daca1ea8a7d60737528b85dcbae",
    "2c310adc1d9d931e4c016fe24a938f13c5b98226ce19320866c73b006d07f006",
    "6a5d009f83be55fd8f994fcdc08679ae13ff7a7b581de3523cee82f3955087f2",
    "cbcd648087839ebbb2876498fbb9ed78e69bf0903794a30a77409c614f2d9719",
];

const PRIME_P: &[&str] = &[
    "e15e6eb27860142b2b68b68b4260dc9c595fdc9dfa5eb2f9ed4a530c70ffbb1a",
    "6c201ff4a292d58134a5ebd52776806ece5168d1e7becdf20ddb4212dc57e199",
    "4f197b858e5202163831bbbbeef99a9a0c3a0aef8080582a7a4e188bbd27780d",
    "6cd6e1c65753b54a0969589f35c494e5654d75c0be6c46f04070d9a3fa69b94b",
];

const PRIME_Q: &[&str] = &[
    "cc1192f49975bff51160601fbd7212b34f2d68c19b25aa1533b2e74e8dcb0774",
    "db0016663cfbd36751a3b246f3439a2f3e93c0b7c0426b585e2e4877a89f6cca",
    "5297b0ab489c63cce4842edc1d644620025054f0eb500a2f82c3a2089d40c9bd",
    "3301c89f05a5161c8f60d8d2e37f2121a1f14263fba1159a2e1952130417ba77",
];

fn from_hex(parts: &[&str]) -> BigUint {
    // A malformed constant parses as zero and fails key validation.
    BigUint::parse_bytes(parts.concat().as_bytes(), 16).unwrap_or_default()
}

/// A 2048-bit two-prime key with `E = 17`, validated but not precomputed.
pub fn test_key_2048() -> Result<PrivateKey, KeyError> {
    PrivateKey::from_components(
        from_hex(MODULUS),
        TEST_KEY_EXPONENT,
        from_hex(PRIVATE_EXPONENT),
        vec![from_hex(PRIME_P), from_hex(PRIME_Q)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_is_a_valid_2048_bit_key() {
        let key = test_key_2048().unwrap();
        assert_eq!(key.public_key().size(), 256);
        assert_eq!(key.public_key().n().bits(), 2048);
        assert_eq!(key.primes().len(), 2);
    }
}
