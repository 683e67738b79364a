//! 사용자 도메인 모델.

mod identity;
mod role;
mod user;

pub use identity::Identity;
pub use role::{is_admin, normalize_role, ROLE_ADMIN, ROLE_USER};
pub use user::{AllUser, NewUser, User, UserPatch};
