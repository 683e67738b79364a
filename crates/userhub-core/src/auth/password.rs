//! 비밀번호 다이제스트 유틸리티.
//!
//! SHA-256 기반의 결정적 단방향 다이제스트입니다. 비밀 키를 사용하지 않으며
//! 같은 입력은 항상 같은 출력을 생성합니다.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// 비밀번호 다이제스트 계산.
///
/// # Arguments
///
/// * `password` - 평문 비밀번호
///
/// # Returns
///
/// 소문자 16진수 문자열 (64자)
///
/// # Example
///
/// ```
/// use userhub_core::hash_password;
///
/// let digest = hash_password("secret");
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, hash_password("secret"));
/// ```
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// 후보 비밀번호가 저장된 다이제스트와 일치하는지 확인.
///
/// 다이제스트를 다시 계산하여 상수 시간으로 비교합니다.
/// 저장된 값이 비어 있으면 항상 불일치입니다.
pub fn verify_password(password: &str, digest: &str) -> bool {
    if digest.is_empty() {
        return false;
    }
    hash_password(password)
        .as_bytes()
        .ct_eq(digest.as_bytes())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_password("secret"),
            "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
    }

    #[test]
    fn test_verify_password() {
        let digest = hash_password("TestPassword123!");

        assert!(verify_password("TestPassword123!", &digest));
        assert!(!verify_password("WrongPassword123!", &digest));
    }

    #[test]
    fn test_empty_digest_never_matches() {
        assert!(!verify_password("", ""));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn test_digest_length_mismatch() {
        let digest = hash_password("secret");

        assert!(!verify_password("secret", &digest[..63]));
        assert!(!verify_password("secret", &format!("{digest}0")));
        assert!(!verify_password("secret", &digest.to_uppercase()));
    }

    #[test]
    fn test_distinct_plaintexts_distinct_digests() {
        let samples = ["secret", "wrongpw", "alice", "bob", "", "한글패스워드123"];
        let digests: std::collections::HashSet<_> =
            samples.iter().map(|p| hash_password(p)).collect();
        assert_eq!(digests.len(), samples.len());
    }

    proptest! {
        #[test]
        fn prop_hash_is_deterministic(p in ".*") {
            prop_assert_eq!(hash_password(&p), hash_password(&p));
        }

        #[test]
        fn prop_digest_is_hex_64(p in ".*") {
            let digest = hash_password(&p);
            prop_assert_eq!(digest.len(), 64);
            prop_assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        }

        #[test]
        fn prop_digest_is_not_plaintext(p in ".{1,32}") {
            prop_assert_ne!(hash_password(&p), p);
        }
    }
}
