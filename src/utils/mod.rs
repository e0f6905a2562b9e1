//! 공통 유틸리티 함수 모듈
//!
//! 애플리케이션 전체에서 사용되는 공통 유틸리티 함수들을 제공합니다.
//!
//! # Modules
//!
//! - [`string_utils`] - 문자열 검증, 정리, 변환 유틸리티
//! - [`request_utils`] - 클라이언트 IP, User-Agent 추출
//! - [`time_utils`] - BSON 시각 계산과 RFC 3339 변환

pub mod string_utils;
pub mod request_utils;
pub mod time_utils;
