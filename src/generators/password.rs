//! Password generator

use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolkitError};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Input for `generate-password`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordParams {
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default = "default_true")]
    pub include_numbers: bool,
    #[serde(default = "default_true")]
    pub include_symbols: bool,
    #[serde(default = "default_true")]
    pub include_uppercase: bool,
    #[serde(default = "default_true")]
    pub include_lowercase: bool,
}

impl Default for PasswordParams {
    fn default() -> Self {
        Self {
            length: default_length(),
            include_numbers: true,
            include_symbols: true,
            include_uppercase: true,
            include_lowercase: true,
        }
    }
}

fn default_length() -> usize {
    16
}

fn default_true() -> bool {
    true
}

/// Rough strength classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strength {
    Strong,
    Medium,
    Weak,
}

/// Output of `generate-password`
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPassword {
    pub password: String,
    pub length: usize,
    pub strength: Strength,
}

/// Generate a random password from the selected character classes
pub fn generate_password(params: &PasswordParams) -> Result<GeneratedPassword> {
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&params.length) {
        return Err(ToolkitError::Generation(format!(
            "length must be between {} and {}",
            MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
        )));
    }

    let charset: Vec<char> = [
        (params.include_lowercase, LOWERCASE),
        (params.include_uppercase, UPPERCASE),
        (params.include_numbers, DIGITS),
        (params.include_symbols, SYMBOLS),
    ]
    .iter()
    .filter(|(enabled, _)| *enabled)
    .flat_map(|(_, chars)| chars.chars())
    .collect();

    if charset.is_empty() {
        return Err(ToolkitError::Generation(
            "At least one character type must be selected".to_string(),
        ));
    }

    let mut rng = OsRng;
    let password: String = (0..params.length)
        .map(|_| charset[rng.gen_range(0..charset.len())])
        .collect();

    Ok(GeneratedPassword {
        password,
        length: params.length,
        strength: classify(params),
    })
}

fn classify(params: &PasswordParams) -> Strength {
    if params.length >= 16 && params.include_numbers && params.include_symbols {
        Strength::Strong
    } else if params.length >= 12 {
        Strength::Medium
    } else {
        Strength::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let out = generate_password(&PasswordParams::default()).unwrap();
        assert_eq!(out.password.chars().count(), 16);
        assert_eq!(out.strength, Strength::Strong);
    }

    #[test]
    fn test_only_digits() {
        let params = PasswordParams {
            length: 32,
            include_symbols: false,
            include_uppercase: false,
            include_lowercase: false,
            ..Default::default()
        };
        let out = generate_password(&params).unwrap();
        assert!(out.password.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(out.strength, Strength::Medium);
    }

    #[test]
    fn test_empty_charset() {
        let params = PasswordParams {
            include_numbers: false,
            include_symbols: false,
            include_uppercase: false,
            include_lowercase: false,
            ..Default::default()
        };
        let err = generate_password(&params).unwrap_err();
        assert_eq!(
            err.to_string(),
            "At least one character type must be selected"
        );
    }

    #[test]
    fn test_length_bounds() {
        for length in [0, 7, 129] {
            let params = PasswordParams {
                length,
                ..Default::default()
            };
            assert!(generate_password(&params).is_err(), "length {}", length);
        }
        let params = PasswordParams {
            length: 8,
            ..Default::default()
        };
        assert_eq!(generate_password(&params).unwrap().strength, Strength::Weak);
    }

    #[test]
    fn test_params_deserialize_camel_case() {
        let params: PasswordParams = serde_json::from_value(serde_json::json!({
            "length": 12,
            "includeSymbols": false,
            "apiKey": "ignored"
        }))
        .unwrap();
        assert_eq!(params.length, 12);
        assert!(!params.include_symbols);
        assert!(params.include_numbers);
    }
}
