//! HTTP 요청 메타데이터 추출 유틸리티

use actix_web::HttpRequest;

/// 클라이언트 IP 후보 헤더 (우선순위 순)
const FORWARDING_HEADERS: [&str; 3] = ["X-Real-IP", "X-Client-IP", "CF-Connecting-IP"];

/// HTTP 요청에서 클라이언트 IP 주소 추출
///
/// 프록시나 로드 밸런서를 고려하여 다양한 헤더에서 실제 클라이언트 IP를 추출합니다.
///
/// # 우선순위
/// 1. `X-Forwarded-For` (첫 번째 IP)
/// 2. `X-Real-IP`
/// 3. `X-Client-IP`
/// 4. `CF-Connecting-IP` (Cloudflare)
/// 5. 연결 정보에서 peer 주소
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    // 체인의 첫 번째가 원본 클라이언트
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded_for.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                let trimmed_ip = first_ip.trim();
                if !trimmed_ip.is_empty() {
                    return Some(trimmed_ip.to_string());
                }
            }
        }
    }

    for header in FORWARDING_HEADERS {
        if let Some(value) = req.headers().get(header).and_then(|h| h.to_str().ok()) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }

    req.peer_addr().map(|addr| addr.ip().to_string())
}

/// User-Agent 헤더 값
pub fn extract_user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}
