//! # Domain Layer
//!
//! 인증/세션 보안 핵심의 도메인 타입을 정의합니다.
//!
//! ```text
//! domain/
//! ├── entities/   영속 엔티티 (User, Session, AccessControlEntry, AuditEntry)
//! ├── models/     비영속 값 객체 (토큰 클레임, 인증 신원, 비밀번호 정책 결과)
//! └── dto/        HTTP 요청/응답 본문
//! ```

pub mod entities;
pub mod dto;
pub mod models;
