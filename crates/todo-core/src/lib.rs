//! # Todo Core
//!
//! 할 일 관리 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 인증 서브시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자 및 세션 레코드
//! - 영속 저장소/캐시 협력자 trait (`UserStore`, `SessionCache`)
//! - 인증 에러 분류 체계
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
