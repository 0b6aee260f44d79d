//! Payload validation: normalization plus table-driven classification.

use regex::Regex;
use serde::{Deserialize, Serialize};

use order_scan_symbology::DecodedSymbol;

/// What a validated payload refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeType {
    /// A short numeric order identifier.
    OrderId,
    /// A stock-keeping-unit code for one line item.
    ItemSku,
    /// Readable payload that matched no pattern.
    Unknown,
}

/// Case handling applied before a pattern is tried.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeRule {
    /// Keep the payload as scanned (numeric ids).
    #[default]
    Preserve,
    /// ASCII-uppercase the payload (SKUs are printed case-insensitively).
    Uppercase,
}

/// One row of the classification table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CodePattern {
    pub code_type: CodeType,
    /// Anchored regular expression the normalized payload must match.
    pub pattern: String,
    #[serde(default)]
    pub normalize: NormalizeRule,
}

/// Validator configuration.
///
/// Patterns are tried in order; the first match wins. The default table
/// recognizes six-digit order ids and `SKU-`/`BST-` prefixed item codes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Accept payloads that match no pattern, classified [`CodeType::Unknown`].
    pub allow_unknown: bool,
    pub patterns: Vec<CodePattern>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            allow_unknown: false,
            patterns: vec![
                CodePattern {
                    code_type: CodeType::OrderId,
                    pattern: "^[0-9]{6}$".to_owned(),
                    normalize: NormalizeRule::Preserve,
                },
                CodePattern {
                    code_type: CodeType::ItemSku,
                    pattern: "^(?:SKU|BST)-[A-Z0-9]{3,12}$".to_owned(),
                    normalize: NormalizeRule::Uppercase,
                },
            ],
        }
    }
}

impl ValidatorConfig {
    /// Replace the default table with custom patterns.
    pub fn with_patterns(patterns: Vec<CodePattern>) -> Self {
        Self {
            allow_unknown: false,
            patterns,
        }
    }
}

/// A normalized, classified payload.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValidatedCode {
    /// Non-empty normalized payload text.
    pub normalized: String,
    pub code_type: CodeType,
}

/// Errors from payload validation.
#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("payload is not valid UTF-8 text")]
    NotText,

    #[error("payload is empty after trimming")]
    EmptyPayload,

    #[error("payload {payload:?} matches no recognized code pattern")]
    UnrecognizedPayload { payload: String },

    #[error("invalid code pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Classifies decoded symbols against the configured pattern table.
#[derive(Clone, Debug)]
pub struct Validator {
    rules: Vec<(CodeType, Regex, NormalizeRule)>,
    allow_unknown: bool,
}

impl Validator {
    /// Compile the configured pattern table.
    pub fn new(config: &ValidatorConfig) -> Result<Self, ValidationError> {
        let mut rules = Vec::with_capacity(config.patterns.len());
        for row in &config.patterns {
            rules.push((row.code_type, Regex::new(&row.pattern)?, row.normalize));
        }
        Ok(Self {
            rules,
            allow_unknown: config.allow_unknown,
        })
    }

    /// Validate one decoded symbol into a classified code.
    ///
    /// Deterministic and free of side effects: the same symbol always
    /// yields the same result.
    pub fn validate(&self, symbol: &DecodedSymbol) -> Result<ValidatedCode, ValidationError> {
        let text = std::str::from_utf8(&symbol.payload).map_err(|_| ValidationError::NotText)?;
        let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace());
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyPayload);
        }

        for (code_type, regex, normalize) in &self.rules {
            let candidate = match normalize {
                NormalizeRule::Preserve => trimmed.to_owned(),
                NormalizeRule::Uppercase => trimmed.to_ascii_uppercase(),
            };
            if regex.is_match(&candidate) {
                return Ok(ValidatedCode {
                    normalized: candidate,
                    code_type: *code_type,
                });
            }
        }

        if self.allow_unknown {
            return Ok(ValidatedCode {
                normalized: trimmed.to_owned(),
                code_type: CodeType::Unknown,
            });
        }
        Err(ValidationError::UnrecognizedPayload {
            payload: trimmed.to_owned(),
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&ValidatorConfig::default()).expect("default patterns compile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_scan_symbology::Symbology;

    fn symbol(payload: &[u8]) -> DecodedSymbol {
        DecodedSymbol {
            payload: payload.to_vec(),
            symbology: Symbology::Qr,
            confidence: None,
        }
    }

    #[test]
    fn six_digit_payload_is_an_order_id() {
        let v = Validator::default();
        let code = v.validate(&symbol(b"123456")).expect("valid");
        assert_eq!(code.code_type, CodeType::OrderId);
        assert_eq!(code.normalized, "123456");
    }

    #[test]
    fn sku_is_uppercased() {
        let v = Validator::default();
        let code = v.validate(&symbol(b"bst-1009")).expect("valid");
        assert_eq!(code.code_type, CodeType::ItemSku);
        assert_eq!(code.normalized, "BST-1009");
    }

    #[test]
    fn whitespace_is_trimmed_before_matching() {
        let v = Validator::default();
        let code = v.validate(&symbol(b"  123456 \n")).expect("valid");
        assert_eq!(code.normalized, "123456");
    }

    #[test]
    fn unmatched_payload_is_rejected() {
        let v = Validator::default();
        let err = v.validate(&symbol(b"XYZZY")).expect_err("no pattern");
        assert!(matches!(
            err,
            ValidationError::UnrecognizedPayload { payload } if payload == "XYZZY"
        ));
    }

    #[test]
    fn unknown_is_allowed_when_configured() {
        let config = ValidatorConfig {
            allow_unknown: true,
            ..ValidatorConfig::default()
        };
        let v = Validator::new(&config).expect("compile");
        let code = v.validate(&symbol(b"XYZZY")).expect("allowed");
        assert_eq!(code.code_type, CodeType::Unknown);
        assert_eq!(code.normalized, "XYZZY");
    }

    #[test]
    fn empty_and_non_text_payloads_fail() {
        let v = Validator::default();
        assert!(matches!(
            v.validate(&symbol(b"   ")),
            Err(ValidationError::EmptyPayload)
        ));
        assert!(matches!(
            v.validate(&symbol(&[0xFF, 0xFE])),
            Err(ValidationError::NotText)
        ));
    }

    #[test]
    fn validation_is_idempotent() {
        let v = Validator::default();
        let s = symbol(b"SKU-ab12");
        let first = v.validate(&s).expect("valid");
        let second = v.validate(&s).expect("valid");
        assert_eq!(first, second);
    }

    #[test]
    fn bad_pattern_fails_at_construction() {
        let config = ValidatorConfig::with_patterns(vec![CodePattern {
            code_type: CodeType::OrderId,
            pattern: "[".to_owned(),
            normalize: NormalizeRule::Preserve,
        }]);
        assert!(matches!(
            Validator::new(&config),
            Err(ValidationError::InvalidPattern(_))
        ));
    }

    #[test]
    fn first_matching_pattern_wins() {
        // A payload matching both rows classifies as the earlier row.
        let config = ValidatorConfig::with_patterns(vec![
            CodePattern {
                code_type: CodeType::ItemSku,
                pattern: "^[0-9]+$".to_owned(),
                normalize: NormalizeRule::Preserve,
            },
            CodePattern {
                code_type: CodeType::OrderId,
                pattern: "^[0-9]{6}$".to_owned(),
                normalize: NormalizeRule::Preserve,
            },
        ]);
        let v = Validator::new(&config).expect("compile");
        let code = v.validate(&symbol(b"123456")).expect("valid");
        assert_eq!(code.code_type, CodeType::ItemSku);
    }
}
