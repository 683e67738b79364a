//! JWT 토큰 처리.
//!
//! 로그인 시 Access Token을 발급하고, 보호된 요청마다 검증합니다.
//! 토큰은 상태가 없으며 서버 측 폐기 목록이 없으므로 로그아웃은 지원하지 않습니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// 기본 토큰 유효 기간 (시간)
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// JWT Access Token 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 로그인 이름
    pub sub: String,
    /// 사용자 ID
    pub user_id: i32,
    /// 로그인 이름
    pub login: String,
    /// 사용자 역할
    pub role: String,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// 새로운 Claims 생성.
    ///
    /// # Arguments
    ///
    /// * `user_id` - 사용자 ID
    /// * `login` - 로그인 이름 (subject로도 사용)
    /// * `role` - 사용자 역할
    /// * `ttl` - 유효 기간
    pub fn new(user_id: i32, login: impl Into<String>, role: impl Into<String>, ttl: Duration) -> Self {
        let login = login.into();
        let now = Utc::now();
        Self {
            sub: login.clone(),
            user_id,
            login,
            role: role.into(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// 토큰이 만료되었는지 확인.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT 서명 키가 설정되지 않았습니다")]
    MissingSecret,
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("유효하지 않은 토큰")]
    Invalid,
}

/// 토큰 발급기 겸 검증기.
///
/// HMAC-SHA256으로 서명하며, 검증 시 HMAC 계열 이외의 알고리즘은 거부합니다.
#[derive(Debug)]
pub struct TokenManager {
    secret: Option<SecretString>,
    ttl: Duration,
}

impl TokenManager {
    /// 새 토큰 관리자 생성.
    ///
    /// 빈 문자열 키는 미설정으로 간주합니다.
    pub fn new(secret: Option<SecretString>) -> Self {
        Self {
            secret: secret.filter(|s| !s.expose_secret().is_empty()),
            ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        }
    }

    /// 문자열 키로 생성 (테스트/개발용).
    pub fn from_secret(secret: &str) -> Self {
        Self::new(Some(SecretString::from(secret.to_owned())))
    }

    /// 토큰 유효 기간 설정.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// 서명 키 설정 여부.
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// 토큰 유효 기간.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Access Token 발급.
    ///
    /// `iat = now`, `exp = now + ttl`, `sub = login`을 포함합니다.
    pub fn issue(&self, user_id: i32, login: &str, role: &str) -> Result<String, TokenError> {
        self.sign(&Claims::new(user_id, login, role, self.ttl))
    }

    /// 주어진 Claims에 서명.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let secret = self.secret.as_ref().ok_or(TokenError::MissingSecret)?;

        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
        )
        .map_err(TokenError::Encoding)
    }

    /// 토큰 디코딩 및 검증.
    ///
    /// 서명 불일치, HMAC 이외의 알고리즘, 형식 오류, 만료 시 실패합니다.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let secret = self.secret.as_ref().ok_or(TokenError::MissingSecret)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = TokenManager::from_secret(TEST_SECRET);

        let token = tokens.issue(42, "alice", "admin").unwrap();
        assert!(!token.is_empty());

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.login, "alice");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_issue_without_secret_fails() {
        let tokens = TokenManager::new(None);
        assert!(matches!(
            tokens.issue(1, "alice", "user"),
            Err(TokenError::MissingSecret)
        ));

        let empty = TokenManager::from_secret("");
        assert!(!empty.has_secret());
        assert!(matches!(
            empty.issue(1, "alice", "user"),
            Err(TokenError::MissingSecret)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenManager::from_secret(TEST_SECRET);
        let claims = Claims::new(1, "alice", "user", Duration::hours(-1));
        assert!(claims.is_expired());

        let token = tokens.sign(&claims).unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_secret() {
        let tokens = TokenManager::from_secret(TEST_SECRET);
        let token = tokens.issue(1, "alice", "user").unwrap();

        let other = TokenManager::from_secret("wrong-secret-key-for-testing-minimum-32-chars");
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_malformed_token() {
        let tokens = TokenManager::from_secret(TEST_SECRET);
        assert!(matches!(
            tokens.verify("invalid.token.here"),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(tokens.verify(""), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_unsigned_token_rejected() {
        // {"alg":"none","typ":"JWT"} . {"sub":"alice","user_id":1,"login":"alice","role":"admin","iat":1700000000,"exp":4102444800} . (서명 없음)
        let unsigned = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.\
eyJzdWIiOiJhbGljZSIsInVzZXJfaWQiOjEsImxvZ2luIjoiYWxpY2UiLCJyb2xlIjoiYWRtaW4iLCJpYXQiOjE3MDAwMDAwMDAsImV4cCI6NDEwMjQ0NDgwMH0.";

        let tokens = TokenManager::from_secret(TEST_SECRET);
        assert!(matches!(tokens.verify(unsigned), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_hs512_token_accepted() {
        let claims = Claims::new(3, "carol", "user", Duration::minutes(5));
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let tokens = TokenManager::from_secret(TEST_SECRET);
        assert_eq!(tokens.verify(&token).unwrap().user_id, 3);
    }

    #[test]
    fn test_custom_ttl() {
        let tokens = TokenManager::from_secret(TEST_SECRET).with_ttl(Duration::minutes(30));
        let claims = tokens.verify(&tokens.issue(1, "a", "user").unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }
}
