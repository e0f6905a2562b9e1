//! 비밀번호 정책 엔진
//!
//! 복잡도 검증, 강도 평가, 무작위 생성, bcrypt 해싱/비교를 담당합니다.
//! 해싱과 비교는 CPU 를 많이 쓰므로 `web::block` 으로 요청 스레드 밖에서 실행합니다.
//!
//! ```rust,ignore
//! let policy = PasswordPolicy::new(12);
//!
//! if let Err(violations) = policy.validate_complexity("Passw0rd!123") {
//!     // violations.codes() == ["SEQUENCE"]
//! }
//!
//! let hash = policy.hash("Gr8!Velvet#Moon").await?;
//! assert!(policy.compare("Gr8!Velvet#Moon", &hash).await?);
//! ```

use std::collections::HashSet;
use actix_web::web;
use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use sha2::{Digest, Sha256};
use crate::core::errors::{AppError, AppResult, ErrorContext};
use crate::domain::models::password::{
    GenerateOptions, PasswordStrength, PasswordViolation, PasswordViolations, StrengthReport,
};

const MIN_LENGTH: usize = 8;
const MAX_LENGTH: usize = 128;
const MAX_REPEAT: usize = 3;

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";
const SIMILAR: &str = "il1Lo0O";

/// 3자 연속 구간을 검사하는 기준 시퀀스 (역방향도 검사)
const SEQUENCES: [&str; 5] = [
    "0123456789",
    "abcdefghijklmnopqrstuvwxyz",
    "qwertyuiop",
    "asdfghjkl",
    "zxcvbnm",
];

static COMMON_PASSWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "password", "password1", "password123", "passw0rd", "p@ssw0rd", "p@ssword",
        "123456", "12345678", "123456789", "1234567890", "111111", "000000",
        "qwerty", "qwerty123", "abc123", "letmein", "welcome", "welcome1",
        "admin", "admin123", "iloveyou", "monkey", "dragon", "football",
        "baseball", "sunshine", "princess", "trustno1", "changeme", "master",
        "shadow", "superman", "college", "college123", "student", "teacher",
    ]
    .into_iter()
    .collect()
});

/// bcrypt 는 앞 72바이트만 읽으므로 SHA-256 다이제스트(base64, 44자)를 해싱합니다.
fn prehash(password: &str) -> String {
    general_purpose::STANDARD.encode(Sha256::digest(password.as_bytes()))
}

fn is_special(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

fn has_repeated_run(chars: &[char]) -> bool {
    chars.windows(MAX_REPEAT + 1).any(|w| w.iter().all(|&c| c == w[0]))
}

fn has_sequence(password: &str) -> bool {
    let lowered: Vec<char> = password.to_lowercase().chars().collect();

    lowered.windows(3).any(|window| {
        let forward: String = window.iter().collect();
        let backward: String = window.iter().rev().collect();
        SEQUENCES
            .iter()
            .any(|seq| seq.contains(forward.as_str()) || seq.contains(backward.as_str()))
    })
}

fn is_common(password: &str) -> bool {
    COMMON_PASSWORDS.contains(password.to_lowercase().as_str())
}

/// 비밀번호 정책 엔진
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    bcrypt_cost: u32,
}

impl PasswordPolicy {
    pub fn new(bcrypt_cost: u32) -> Self {
        Self { bcrypt_cost }
    }

    /// 모든 복잡도 규칙을 검사하고, 위반이 있으면 전부 돌려줍니다.
    pub fn validate_complexity(&self, password: &str) -> Result<(), PasswordViolations> {
        let chars: Vec<char> = password.chars().collect();
        let mut violations = Vec::new();

        if chars.len() < MIN_LENGTH {
            violations.push(PasswordViolation::TooShort);
        }
        if chars.len() > MAX_LENGTH {
            violations.push(PasswordViolation::TooLong);
        }
        if !chars.iter().any(|c| c.is_uppercase()) {
            violations.push(PasswordViolation::MissingUppercase);
        }
        if !chars.iter().any(|c| c.is_lowercase()) {
            violations.push(PasswordViolation::MissingLowercase);
        }
        if !chars.iter().any(|c| c.is_ascii_digit()) {
            violations.push(PasswordViolation::MissingDigit);
        }
        if !chars.iter().any(|&c| is_special(c)) {
            violations.push(PasswordViolation::MissingSpecial);
        }
        if has_repeated_run(&chars) {
            violations.push(PasswordViolation::RepeatedCharacters);
        }
        if is_common(password) {
            violations.push(PasswordViolation::CommonPassword);
        }
        if has_sequence(password) {
            violations.push(PasswordViolation::Sequence);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(PasswordViolations(violations))
        }
    }

    /// 0..=10 강도 점수와 개선 피드백
    pub fn score(&self, password: &str) -> StrengthReport {
        let chars: Vec<char> = password.chars().collect();
        let mut score: i32 = 0;
        let mut feedback = Vec::new();

        for tier in [8, 12, 16, 20] {
            if chars.len() >= tier {
                score += 1;
            }
        }
        if chars.len() < 12 {
            feedback.push("12자 이상으로 늘리면 더 안전합니다".to_string());
        }

        let classes = [
            (chars.iter().any(|c| c.is_lowercase()), "소문자를 추가하세요"),
            (chars.iter().any(|c| c.is_uppercase()), "대문자를 추가하세요"),
            (chars.iter().any(|c| c.is_ascii_digit()), "숫자를 추가하세요"),
            (chars.iter().any(|&c| is_special(c)), "특수문자를 추가하세요"),
        ];
        for (present, hint) in classes {
            if present {
                score += 1;
            } else {
                feedback.push(hint.to_string());
            }
        }
        if classes.iter().all(|(present, _)| *present) {
            score += 2;
        }

        if has_repeated_run(&chars) {
            score -= 2;
            feedback.push(PasswordViolation::RepeatedCharacters.message().to_string());
        }
        if has_sequence(password) {
            score -= 2;
            feedback.push(PasswordViolation::Sequence.message().to_string());
        }
        if is_common(password) {
            score -= 3;
            feedback.push(PasswordViolation::CommonPassword.message().to_string());
        }

        let score = score.clamp(0, 10) as u8;
        StrengthReport {
            score,
            strength: PasswordStrength::from_score(score),
            feedback,
        }
    }

    /// 요청된 문자 종류를 최소 하나씩 포함하는 무작위 비밀번호
    pub fn generate(&self, length: usize, options: &GenerateOptions) -> AppResult<String> {
        let strip_similar = |set: &str| -> Vec<char> {
            set.chars()
                .filter(|c| !options.exclude_similar || !SIMILAR.contains(*c))
                .collect()
        };

        let classes: Vec<Vec<char>> = [
            (options.uppercase, UPPERCASE),
            (options.lowercase, LOWERCASE),
            (options.numbers, NUMBERS),
            (options.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, set)| strip_similar(set))
        .collect();

        if classes.is_empty() {
            return Err(AppError::ConfigurationError(
                "비밀번호 생성에 사용할 문자 종류가 없습니다".to_string(),
            ));
        }
        if length < classes.len() {
            return Err(AppError::ConfigurationError(format!(
                "비밀번호 길이({})가 요청된 문자 종류 수({})보다 짧습니다",
                length,
                classes.len()
            )));
        }

        let mut rng = rand::thread_rng();
        let mut password = Vec::with_capacity(length);
        for class in &classes {
            if let Some(&c) = class.choose(&mut rng) {
                password.push(c);
            }
        }

        let pool: Vec<char> = classes.concat();
        while password.len() < length {
            if let Some(&c) = pool.choose(&mut rng) {
                password.push(c);
            }
        }

        password.shuffle(&mut rng);
        Ok(password.into_iter().collect())
    }

    /// 복잡도 검증 후 bcrypt 해싱
    pub async fn hash(&self, password: &str) -> AppResult<String> {
        self.validate_complexity(password).map_err(AppError::WeakPassword)?;

        let password = prehash(password);
        let cost = self.bcrypt_cost;
        web::block(move || bcrypt::hash(password, cost))
            .await?
            .context("비밀번호 해싱 실패")
    }

    /// 평문과 해시 비교. 손상된 해시는 불일치로 처리합니다.
    pub async fn compare(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = prehash(password);
        let hash = hash.to_string();

        match web::block(move || bcrypt::verify(password, &hash)).await? {
            Ok(matches) => Ok(matches),
            Err(e) => {
                log::warn!("⚠️ 비밀번호 해시 검증 실패: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRONG: &str = "Gr8!Velvet#Moon";

    fn policy() -> PasswordPolicy {
        PasswordPolicy::new(4)
    }

    #[test]
    fn test_strong_password_passes() {
        assert!(policy().validate_complexity(STRONG).is_ok());
    }

    #[test]
    fn test_numeric_sequence_is_rejected() {
        let violations = policy().validate_complexity("Passw0rd!123").unwrap_err();

        assert_eq!(violations.0, vec![PasswordViolation::Sequence]);
        assert!(violations.to_string().contains("시퀀스"));
    }

    #[test]
    fn test_reports_every_violation() {
        let violations = policy().validate_complexity("password").unwrap_err();

        assert!(violations.contains(PasswordViolation::MissingUppercase));
        assert!(violations.contains(PasswordViolation::MissingDigit));
        assert!(violations.contains(PasswordViolation::MissingSpecial));
        assert!(violations.contains(PasswordViolation::CommonPassword));
        assert!(!violations.contains(PasswordViolation::TooShort));
    }

    #[test]
    fn test_length_bounds() {
        assert!(policy().validate_complexity("G8!v").unwrap_err().contains(PasswordViolation::TooShort));

        let long = format!("{}{}", STRONG, "x".repeat(120));
        assert!(policy().validate_complexity(&long).unwrap_err().contains(PasswordViolation::TooLong));
    }

    #[test]
    fn test_repeated_characters() {
        let violations = policy().validate_complexity("Gr8!Vzzzz#Moon").unwrap_err();
        assert_eq!(violations.0, vec![PasswordViolation::RepeatedCharacters]);

        // 3회 연속은 허용
        assert!(policy().validate_complexity("Gr8!Vzzz#Moon").is_ok());
    }

    #[test]
    fn test_keyboard_and_reverse_sequences() {
        for candidate in ["Gr8!Qwe#Moon", "Gr8!Cba#Moon", "Gr8!V#Moon987", "Gr8!LKJ#Moon"] {
            let violations = policy().validate_complexity(candidate).unwrap_err();
            assert!(violations.contains(PasswordViolation::Sequence), "{}", candidate);
        }
    }

    #[test]
    fn test_score_buckets() {
        let strong = policy().score(STRONG);
        assert_eq!(strong.score, 8);
        assert_eq!(strong.strength, PasswordStrength::Strong);

        let weak = policy().score("password");
        assert_eq!(weak.strength, PasswordStrength::VeryWeak);
        assert!(!weak.feedback.is_empty());
    }

    #[test]
    fn test_generate_contains_each_requested_class() {
        let options = GenerateOptions::default();
        let password = policy().generate(12, &options).unwrap();

        assert_eq!(password.chars().count(), 12);
        assert!(password.chars().any(|c| c.is_ascii_uppercase()));
        assert!(password.chars().any(|c| c.is_ascii_lowercase()));
        assert!(password.chars().any(|c| c.is_ascii_digit()));
        assert!(password.chars().any(|c| SYMBOLS.contains(c)));
    }

    #[test]
    fn test_generate_excludes_similar_characters() {
        let options = GenerateOptions { exclude_similar: true, ..GenerateOptions::default() };

        for _ in 0..20 {
            let password = policy().generate(32, &options).unwrap();
            assert!(!password.chars().any(|c| SIMILAR.contains(c)));
        }
    }

    #[test]
    fn test_generate_rejects_empty_charset() {
        let options = GenerateOptions {
            uppercase: false,
            lowercase: false,
            numbers: false,
            symbols: false,
            exclude_similar: false,
        };
        assert!(matches!(
            policy().generate(12, &options),
            Err(AppError::ConfigurationError(_))
        ));
        assert!(policy().generate(3, &GenerateOptions::default()).is_err());
    }

    #[actix_web::test]
    async fn test_hash_and_compare_round_trip() {
        let policy = policy();
        let hash = policy.hash(STRONG).await.unwrap();

        assert_ne!(hash, STRONG);
        assert!(policy.compare(STRONG, &hash).await.unwrap());
        assert!(!policy.compare("Gr8!Velvet#Mood", &hash).await.unwrap());
    }

    #[actix_web::test]
    async fn test_long_passwords_differing_after_72_bytes() {
        let policy = policy();
        let base = STRONG.repeat(5);
        let first = format!("{}A", base);
        let second = format!("{}B", base);
        assert!(first.len() > 72);
        assert!(policy.validate_complexity(&first).is_ok());
        assert!(policy.validate_complexity(&second).is_ok());

        let hash = policy.hash(&first).await.unwrap();
        assert!(policy.compare(&first, &hash).await.unwrap());
        assert!(!policy.compare(&second, &hash).await.unwrap());
    }

    #[actix_web::test]
    async fn test_hash_rejects_weak_password() {
        let result = policy().hash("Passw0rd!123").await;
        assert!(matches!(result, Err(AppError::WeakPassword(_))));
    }

    #[actix_web::test]
    async fn test_compare_with_corrupt_hash_is_false() {
        assert!(!policy().compare(STRONG, "not-a-bcrypt-hash").await.unwrap());
    }
}
