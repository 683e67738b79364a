//! 요청 범위의 인증된 사용자 정보.

use serde::{Deserialize, Serialize};

use super::role::is_admin;

/// 검증된 토큰에서 추출한 호출자 정보.
///
/// 인증 미들웨어가 요청 extensions에 저장하고, 하위 핸들러가 타입 안전하게 읽습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i32,
    pub login: String,
    pub role: String,
}

impl Identity {
    /// 관리자 여부.
    pub fn is_admin(&self) -> bool {
        is_admin(&self.role)
    }

    /// 대상 사용자가 호출자 본인인지 확인.
    pub fn is_self(&self, target_id: i32) -> bool {
        self.user_id == target_id
    }
}
