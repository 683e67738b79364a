//! 사용자 역할.
//!
//! 역할은 열린 문자열 집합입니다. `"admin"`만 특권 역할이며,
//! 역할이 지정되지 않은 사용자는 `"user"`로 저장됩니다.

/// 관리자 역할 - 관리 라우트 접근 가능
pub const ROLE_ADMIN: &str = "admin";

/// 기본 역할
pub const ROLE_USER: &str = "user";

/// 관리자 역할인지 확인.
///
/// 대소문자를 구분하여 정확히 일치해야 합니다.
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}

/// 빈 역할을 기본 역할로 치환.
pub fn normalize_role(role: Option<&str>) -> String {
    match role {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => ROLE_USER.to_string(),
    }
}
