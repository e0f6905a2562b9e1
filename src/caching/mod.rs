//! 캐싱 계층 모듈
//!
//! Redis 를 백엔드로 하는 단기 저장소와 JSON 기반 직렬화를 제공합니다.
//!
//! # 주요 기능
//!
//! - 멀티플렉싱 연결
//! - TTL 지원 저장과 한 번만 읽히는 `take`
//!
//! # 환경 설정
//!
//! ```bash
//! REDIS_URL=redis://localhost:6379  # 기본값
//! ```

pub mod redis;
