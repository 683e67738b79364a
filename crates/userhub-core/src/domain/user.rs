//! 사용자 레코드 및 입력 타입.

use serde::{Deserialize, Serialize};

/// 저장된 사용자 레코드.
///
/// `password`에는 항상 다이제스트가 저장되며 평문은 저장되지 않습니다.
/// 서비스/핸들러 경계를 벗어나는 값은 [`User::scrub`]을 거쳐 빈 문자열이 됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct User {
    /// 기본 키 (저장소에서 할당, 이후 불변)
    pub id: i32,
    /// 로그인 이름 (전체 사용자 중 유일)
    pub login: String,
    /// 비밀번호 다이제스트
    #[serde(default)]
    pub password: String,
    /// 역할
    #[serde(default)]
    pub role: String,
}

impl User {
    /// 비밀번호 필드를 비웁니다.
    pub fn scrub(mut self) -> Self {
        self.password.clear();
        self
    }
}

/// 공개 목록용 사용자 투영 (비밀번호 제외).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct AllUser {
    pub id: i32,
    pub login: String,
    pub role: String,
}

impl From<User> for AllUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
            role: user.role,
        }
    }
}

/// 사용자 생성 입력.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    /// 로그인 이름 (필수)
    pub login: String,
    /// 평문 비밀번호 (필수, 저장 전 해싱)
    pub password: String,
    /// 역할 (없거나 비어 있으면 "user")
    pub role: Option<String>,
}

/// 사용자 수정 입력.
///
/// `None`과 빈 문자열은 모두 "현재 값 유지"를 의미합니다.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub login: Option<String>,
    /// 평문 비밀번호 (교체 시에만 재해싱)
    pub password: Option<String>,
    pub role: Option<String>,
}

impl UserPatch {
    /// 현재 레코드에 패치를 병합합니다.
    ///
    /// 비밀번호가 교체되는 경우 `hash`로 다이제스트를 계산합니다.
    pub fn merge_into(self, current: User, hash: impl Fn(&str) -> String) -> User {
        fn provided(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }

        User {
            id: current.id,
            login: provided(self.login).unwrap_or(current.login),
            password: provided(self.password)
                .map(|p| hash(&p))
                .unwrap_or(current.password),
            role: provided(self.role).unwrap_or(current.role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> User {
        User {
            id: 7,
            login: "bob".to_string(),
            password: "digest-of-old".to_string(),
            role: "user".to_string(),
        }
    }

    #[test]
    fn test_scrub_clears_password() {
        let user = stored().scrub();
        assert!(user.password.is_empty());
        assert_eq!(user.login, "bob");
    }

    #[test]
    fn test_all_user_has_no_password_field() {
        let json = serde_json::to_value(AllUser::from(stored())).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["login"], "bob");
    }

    #[test]
    fn test_merge_role_only() {
        let patch = UserPatch {
            role: Some("admin".to_string()),
            ..Default::default()
        };
        let merged = patch.merge_into(stored(), |p| format!("h({})", p));

        assert_eq!(merged.id, 7);
        assert_eq!(merged.login, "bob");
        assert_eq!(merged.password, "digest-of-old");
        assert_eq!(merged.role, "admin");
    }

    #[test]
    fn test_merge_empty_strings_keep_current() {
        let patch = UserPatch {
            login: Some(String::new()),
            password: Some(String::new()),
            role: Some(String::new()),
        };
        let merged = patch.merge_into(stored(), |p| format!("h({})", p));
        assert_eq!(merged, stored());
    }

    #[test]
    fn test_merge_password_is_rehashed() {
        let patch = UserPatch {
            password: Some("new".to_string()),
            ..Default::default()
        };
        let merged = patch.merge_into(stored(), |p| format!("h({})", p));
        assert_eq!(merged.password, "h(new)");
    }
}
