//! Code generation and salted hashing

use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng, RngCore};
use sha2::{Digest, Sha256};

use sw_shared::config::CodeCharset;

/// Draw a code of `length` characters uniformly from the charset using the OS CSPRNG
pub fn generate_code(length: usize, charset: CodeCharset) -> String {
    let alphabet = charset.alphabet();
    let mut rng = OsRng;
    (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Random salt of `bytes` bytes, hex encoded
pub fn generate_salt(bytes: usize) -> String {
    let mut salt = vec![0u8; bytes];
    OsRng.fill_bytes(&mut salt);
    hex::encode(salt)
}

/// Lowercase hex SHA-256 of `code + salt`
pub fn hash_code(code: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time check of a submitted code against a stored hash
pub fn matches(submitted: &str, salt: &str, expected_hash: &str) -> bool {
    let computed = hash_code(submitted, salt);
    constant_time_eq(computed.as_bytes(), expected_hash.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_numeric_code_format() {
        for _ in 0..100 {
            let code = generate_code(6, CodeCharset::Numeric);
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generate_alphanumeric_code_uses_alphabet() {
        let alphabet = CodeCharset::Alphanumeric.alphabet();
        let code = generate_code(12, CodeCharset::Alphanumeric);
        assert_eq!(code.len(), 12);
        assert!(code.bytes().all(|b| alphabet.contains(&b)));
    }

    #[test]
    fn test_codes_vary() {
        let codes: HashSet<String> = (0..100).map(|_| generate_code(6, CodeCharset::Numeric)).collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn test_salt_length_and_uniqueness() {
        let a = generate_salt(16);
        let b = generate_salt(16);
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_is_salted_lowercase_hex() {
        let h1 = hash_code("123456", "aa");
        let h2 = hash_code("123456", "bb");
        assert_eq!(h1.len(), 64);
        assert_ne!(h1, h2);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_matches() {
        let salt = generate_salt(16);
        let hash = hash_code("482913", &salt);
        assert!(matches("482913", &salt, &hash));
        assert!(!matches("482914", &salt, &hash));
        assert!(!matches("", &salt, &hash));
    }
}
