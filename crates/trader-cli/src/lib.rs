//! CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 라이브 트레이딩 세션 실행
//! - 설정 검증

pub mod commands;
