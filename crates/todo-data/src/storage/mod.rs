//! 저장소 어댑터.

pub mod memory;
pub mod postgres;
pub mod redis;
