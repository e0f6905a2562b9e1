/// 인증 모드를 정의하는 열거형
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    /// 인증이 반드시 필요함
    Required,
    /// 인증이 선택사항임 (있으면 검증, 없어도 허용)
    Optional,
}

/// 인가 미들웨어가 적용하는 접근 규칙
#[derive(Debug, Clone, PartialEq)]
pub enum AccessRule {
    /// 사용자 역할이 목록 중 하나여야 함
    Role(Vec<String>),
    /// 특정 권한 (범위 지정 가능)
    Permission { name: String, scope: Option<String> },
    /// 권한 중 하나라도 보유
    AnyPermission(Vec<String>),
    /// 경로 파라미터의 기관 ID 와 사용자 소속 기관이 같아야 함
    InstituteAccess { param: String },
    /// 경로 파라미터의 사용자 ID 와 인증 사용자가 같아야 함
    ResourceOwnership { param: String },
}

impl AccessRule {
    /// 경로 파라미터를 사용하는 규칙이면 파라미터 이름
    pub fn path_param(&self) -> Option<&str> {
        match self {
            AccessRule::InstituteAccess { param } | AccessRule::ResourceOwnership { param } => {
                Some(param.as_str())
            }
            _ => None,
        }
    }
}
