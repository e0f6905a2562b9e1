//! 비밀번호 정책 모델
//!
//! 복잡도 검사 결과는 예외 문자열이 아니라 위반 코드 목록으로 표현됩니다.
//! 호출자는 코드 목록을 그대로 응답에 싣거나 메시지로 렌더링할 수 있습니다.

use std::fmt;
use serde::{Deserialize, Serialize};

/// 단일 복잡도 위반 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PasswordViolation {
    TooShort,
    TooLong,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSpecial,
    RepeatedCharacters,
    CommonPassword,
    Sequence,
}

impl PasswordViolation {
    /// 응답에 노출되는 기계 판독용 코드
    pub fn code(&self) -> &'static str {
        match self {
            PasswordViolation::TooShort => "TOO_SHORT",
            PasswordViolation::TooLong => "TOO_LONG",
            PasswordViolation::MissingUppercase => "MISSING_UPPERCASE",
            PasswordViolation::MissingLowercase => "MISSING_LOWERCASE",
            PasswordViolation::MissingDigit => "MISSING_DIGIT",
            PasswordViolation::MissingSpecial => "MISSING_SPECIAL",
            PasswordViolation::RepeatedCharacters => "REPEATED_CHARACTERS",
            PasswordViolation::CommonPassword => "COMMON_PASSWORD",
            PasswordViolation::Sequence => "SEQUENCE",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PasswordViolation::TooShort => "비밀번호는 최소 8자 이상이어야 합니다",
            PasswordViolation::TooLong => "비밀번호는 128자를 넘을 수 없습니다",
            PasswordViolation::MissingUppercase => "대문자를 하나 이상 포함해야 합니다",
            PasswordViolation::MissingLowercase => "소문자를 하나 이상 포함해야 합니다",
            PasswordViolation::MissingDigit => "숫자를 하나 이상 포함해야 합니다",
            PasswordViolation::MissingSpecial => "특수문자를 하나 이상 포함해야 합니다",
            PasswordViolation::RepeatedCharacters => "같은 문자를 4번 이상 연속으로 사용할 수 없습니다",
            PasswordViolation::CommonPassword => "너무 흔한 비밀번호입니다",
            PasswordViolation::Sequence => {
                "연속된 문자 시퀀스(예: 123, abc, qwe)는 사용할 수 없습니다"
            }
        }
    }
}

/// 복잡도 검사에서 발견된 모든 위반 사유
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PasswordViolations(pub Vec<PasswordViolation>);

impl PasswordViolations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, violation: PasswordViolation) -> bool {
        self.0.contains(&violation)
    }

    pub fn codes(&self) -> Vec<&'static str> {
        self.0.iter().map(|v| v.code()).collect()
    }

    pub fn messages(&self) -> Vec<&'static str> {
        self.0.iter().map(|v| v.message()).collect()
    }
}

impl fmt::Display for PasswordViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join(", "))
    }
}

/// 비밀번호 강도 구간
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PasswordStrength {
    #[serde(rename = "Very Weak")]
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    #[serde(rename = "Very Strong")]
    VeryStrong,
}

impl PasswordStrength {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=2 => PasswordStrength::VeryWeak,
            3..=4 => PasswordStrength::Weak,
            5..=6 => PasswordStrength::Moderate,
            7..=8 => PasswordStrength::Strong,
            _ => PasswordStrength::VeryStrong,
        }
    }
}

/// 강도 평가 결과
#[derive(Debug, Clone, Serialize)]
pub struct StrengthReport {
    /// 0..=10
    pub score: u8,
    pub strength: PasswordStrength,
    pub feedback: Vec<String>,
}

/// 비밀번호 생성 옵션
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
    /// `il1Lo0O` 처럼 헷갈리는 문자를 제외
    pub exclude_similar: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
            exclude_similar: false,
        }
    }
}
