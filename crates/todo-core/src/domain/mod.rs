//! 도메인 모델.
//!
//! 사용자, 세션, 토큰 쌍과 인증 서비스가 의존하는 협력자 인터페이스를 정의합니다.

pub mod session;
pub mod session_cache;
pub mod user;
pub mod user_store;

pub use session::{Session, TokenPair};
pub use session_cache::{CacheError, SessionCache};
pub use user::{NewUser, User, UserId, UserProfile};
pub use user_store::{StoreError, UserStore};
