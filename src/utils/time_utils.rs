//! BSON 시각 변환 유틸리티
//!
//! 엔티티는 TTL 인덱스와 호환되도록 `bson::DateTime` 을 저장하고,
//! 응답 DTO 는 RFC 3339 문자열로 내보냅니다.

use chrono::Utc;
use mongodb::bson::DateTime;

/// 현재 시각에 초 단위 오프셋을 더한 BSON 시각
pub fn now_plus_secs(secs: i64) -> DateTime {
    after(DateTime::now(), secs)
}

/// 기준 시각에 초 단위 오프셋을 더한 BSON 시각. 범위를 넘으면 포화됩니다.
pub fn after(at: DateTime, secs: i64) -> DateTime {
    DateTime::from_millis(at.timestamp_millis().saturating_add(secs.saturating_mul(1000)))
}

/// 기준 시각에서 초 단위 오프셋을 뺀 BSON 시각
pub fn before(at: DateTime, secs: i64) -> DateTime {
    DateTime::from_millis(at.timestamp_millis().saturating_sub(secs.saturating_mul(1000)))
}

/// RFC 3339 문자열 변환
pub fn to_rfc3339(at: DateTime) -> String {
    chrono::DateTime::<Utc>::from_timestamp_millis(at.timestamp_millis())
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

pub fn to_rfc3339_opt(at: Option<DateTime>) -> Option<String> {
    at.map(to_rfc3339)
}
