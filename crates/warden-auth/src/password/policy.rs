//! Strong-password policy.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use warden_core::config::PasswordConfig;
use warden_core::error::AppError;

/// Decimal digit in any script.
static DIGIT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\p{Nd}").ok());

/// Printable punctuation or symbol in any script.
static SYMBOL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[\p{P}\p{S}]").ok());

/// One unmet requirement. Safe to show to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    /// Fewer code points than the minimum.
    #[error("password must be at least {min} characters long")]
    TooShort {
        /// Required minimum.
        min: usize,
    },
    /// More code points than the maximum.
    #[error("password must be at most {max} characters long")]
    TooLong {
        /// Allowed maximum.
        max: usize,
    },
    #[error("password must contain an uppercase letter")]
    MissingUppercase,
    #[error("password must contain a lowercase letter")]
    MissingLowercase,
    #[error("password must contain a digit")]
    MissingDigit,
    #[error("password must contain a symbol")]
    MissingSymbol,
}

/// Length bounds plus independently toggled character-class requirements.
///
/// Length is counted in Unicode scalar values, so characters outside the
/// basic multilingual plane count once.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
    max_length: usize,
    require_uppercase: bool,
    require_lowercase: bool,
    require_digit: bool,
    require_symbol: bool,
}

impl PasswordPolicy {
    /// Creates a policy from configuration.
    ///
    /// Fails with a configuration error when the minimum exceeds the maximum.
    pub fn new(config: &PasswordConfig) -> Result<Self, AppError> {
        Self::from_config(config).checked("password.min_length")
    }

    /// A copy of this policy with a different minimum length, bounded by the
    /// same maximum.
    pub fn with_min_length(&self, min_length: usize) -> Result<Self, AppError> {
        Self {
            min_length,
            ..self.clone()
        }
        .checked("reset.min_password_length")
    }

    fn from_config(config: &PasswordConfig) -> Self {
        Self {
            min_length: config.min_length,
            max_length: config.max_length,
            require_uppercase: config.require_uppercase,
            require_lowercase: config.require_lowercase,
            require_digit: config.require_digit,
            require_symbol: config.require_symbol,
        }
    }

    fn checked(self, field: &str) -> Result<Self, AppError> {
        if self.min_length > self.max_length {
            return Err(AppError::configuration(format!(
                "{field} ({}) exceeds password.max_length ({})",
                self.min_length, self.max_length
            )));
        }
        Ok(self)
    }

    /// Checks every rule and reports all that fail.
    pub fn validate(&self, password: &str) -> Result<(), Vec<PolicyViolation>> {
        let mut violations = Vec::new();

        let length = password.chars().count();
        if length < self.min_length {
            violations.push(PolicyViolation::TooShort {
                min: self.min_length,
            });
        }
        if length > self.max_length {
            violations.push(PolicyViolation::TooLong {
                max: self.max_length,
            });
        }

        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            violations.push(PolicyViolation::MissingUppercase);
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            violations.push(PolicyViolation::MissingLowercase);
        }
        if self.require_digit && !contains(&DIGIT, password) {
            violations.push(PolicyViolation::MissingDigit);
        }
        if self.require_symbol && !contains(&SYMBOL, password) {
            violations.push(PolicyViolation::MissingSymbol);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

fn contains(pattern: &LazyLock<Option<Regex>>, password: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(password))
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::from_config(&PasswordConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_examples() {
        let policy = PasswordPolicy::default();
        assert_eq!(policy.validate("Abcdef1!"), Ok(()));
        assert_eq!(
            policy.validate("abcdefg1!"),
            Err(vec![PolicyViolation::MissingUppercase])
        );

        let long = format!("Abcdef1!{}", "a".repeat(57));
        assert_eq!(long.chars().count(), 65);
        assert_eq!(
            policy.validate(&long),
            Err(vec![PolicyViolation::TooLong { max: 64 }])
        );
    }

    #[test]
    fn test_violations_are_independent() {
        let policy = PasswordPolicy::default();
        assert_eq!(
            policy.validate("abc"),
            Err(vec![
                PolicyViolation::TooShort { min: 8 },
                PolicyViolation::MissingUppercase,
                PolicyViolation::MissingDigit,
                PolicyViolation::MissingSymbol,
            ])
        );
    }

    #[test]
    fn test_unicode_classes() {
        let policy = PasswordPolicy::default();
        // Arabic-Indic digit, Greek letters, and a currency symbol.
        assert_eq!(policy.validate("Ωmegaλ٣€"), Ok(()));
        // Emoji outside the BMP counts as one symbol code point.
        assert_eq!(policy.validate("Abcdef1\u{1F600}"), Ok(()));
    }

    #[test]
    fn test_length_counts_code_points() {
        let policy = PasswordPolicy::default().with_min_length(9).unwrap();
        // 8 code points but more than 8 UTF-16 units.
        let password = "Ab1!\u{1F600}\u{1F600}\u{1F600}\u{1F600}";
        assert_eq!(password.chars().count(), 8);
        assert_eq!(
            policy.validate(password),
            Err(vec![PolicyViolation::TooShort { min: 9 }])
        );
    }

    #[test]
    fn test_toggles() {
        let config = PasswordConfig {
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_symbol: false,
            ..PasswordConfig::default()
        };
        assert_eq!(
            PasswordPolicy::new(&config).unwrap().validate("aaaaaaaa"),
            Ok(())
        );
    }

    #[test]
    fn test_reset_minimum_override() {
        let policy = PasswordPolicy::default().with_min_length(12).unwrap();
        assert_eq!(
            policy.validate("Abcdef1!"),
            Err(vec![PolicyViolation::TooShort { min: 12 }])
        );
        assert_eq!(policy.validate("Abcdefghi1!?"), Ok(()));
    }

    #[test]
    fn test_min_above_max_is_rejected() {
        let config = PasswordConfig {
            min_length: 65,
            ..PasswordConfig::default()
        };
        let err = PasswordPolicy::new(&config).unwrap_err();
        assert!(err.is(warden_core::error::ErrorKind::Configuration));

        let err = PasswordPolicy::default().with_min_length(65).unwrap_err();
        assert!(err.is(warden_core::error::ErrorKind::Configuration));
        assert!(err.message.contains("reset.min_password_length"));

        assert!(PasswordPolicy::default().with_min_length(64).is_ok());
    }
}
