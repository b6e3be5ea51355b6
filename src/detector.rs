use regex::Regex;

use crate::error::{PipelineError, Result};
use crate::models::IdPattern;

/// Finds the first parenthesised branch ID in a normalized company name.
#[derive(Debug, Clone)]
pub struct IdDetector {
    pattern: IdPattern,
    regex: Regex,
}

impl IdDetector {
    pub fn new(pattern: IdPattern) -> Result<Self> {
        let source = match pattern {
            IdPattern::Fixed(0) => {
                return Err(PipelineError::IdPattern {
                    pattern: pattern.to_string(),
                    reason: "an ID needs at least one digit".to_string(),
                })
            }
            IdPattern::Fixed(n) => format!(r"\((\d{{{}}})\)", n),
            IdPattern::Variable => r"\((\d+)\)".to_string(),
        };
        let regex = Regex::new(&source).map_err(|e| PipelineError::IdPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern, regex })
    }

    pub fn pattern(&self) -> IdPattern {
        self.pattern
    }

    /// Digits of the first matching `(…)` span, if any.
    pub fn detect<'a>(&self, company_name: &'a str) -> Option<&'a str> {
        self.regex
            .captures(company_name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_pattern_requires_exact_length() {
        let detector = IdDetector::new(IdPattern::Fixed(5)).unwrap();
        assert_eq!(detector.detect("Shop Alpha (00123)"), Some("00123"));
        assert_eq!(detector.detect("Shop Alpha (0123)"), None);
        assert_eq!(detector.detect("Shop Alpha (001234)"), None);
        assert_eq!(detector.detect("Shop Alpha 00123"), None);
    }

    #[test]
    fn test_variable_pattern_takes_first_match() {
        let detector = IdDetector::new(IdPattern::Variable).unwrap();
        assert_eq!(detector.detect("Shop (7) Alpha (00123)"), Some("7"));
        assert_eq!(detector.detect("Shop (Downtown)"), None);
        assert_eq!(detector.detect("Shop ()"), None);
    }

    #[test]
    fn test_zero_length_pattern_is_rejected() {
        assert!(matches!(
            IdDetector::new(IdPattern::Fixed(0)),
            Err(PipelineError::IdPattern { .. })
        ));
    }
}
