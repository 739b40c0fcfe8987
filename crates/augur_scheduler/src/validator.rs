//! Turning endpoint replies into attempt outcomes.

use augur_core::{SCORE_MAX, SCORE_MIN, Score};
use augur_models::ReplyClass;
use augur_rate_limit::AttemptOutcome;

/// Checks that an answer is a single integer score.
///
/// # Examples
///
/// ```
/// use augur_core::Score;
/// use augur_rate_limit::AttemptOutcome;
/// use augur_scheduler::ResponseValidator;
///
/// let validator = ResponseValidator;
/// assert_eq!(validator.validate(" 45\n"), AttemptOutcome::Valid(Score::new(45).unwrap()));
/// assert!(matches!(validator.validate("101"), AttemptOutcome::InvalidOutput(_)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseValidator;

impl ResponseValidator {
    /// Validate the answer text of a completion.
    ///
    /// The trimmed text must parse as an integer in `SCORE_MIN..=SCORE_MAX`;
    /// anything else is invalid output.
    pub fn validate(&self, text: &str) -> AttemptOutcome {
        let trimmed = text.trim();
        match trimmed.parse::<i32>() {
            Ok(value) => match Score::new(value) {
                Some(score) => AttemptOutcome::Valid(score),
                None => AttemptOutcome::InvalidOutput(format!(
                    "{} is outside {}..={}",
                    value, SCORE_MIN, SCORE_MAX
                )),
            },
            Err(_) => AttemptOutcome::InvalidOutput(format!("not an integer: {:?}", trimmed)),
        }
    }

    /// Map a classified reply to the outcome of the attempt.
    ///
    /// A reply whose text could not be extracted is transient, not invalid.
    pub fn interpret(&self, reply: &ReplyClass) -> AttemptOutcome {
        match reply {
            ReplyClass::Completion(text) => self.validate(text),
            ReplyClass::RateLimited { hint, message } => AttemptOutcome::RateLimited {
                hint: *hint,
                message: message.clone(),
            },
            ReplyClass::Rejected { status, message } => {
                AttemptOutcome::Rejected(format!("HTTP {}: {}", status, message))
            }
            ReplyClass::Malformed(reason) => AttemptOutcome::Transient(reason.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_valid_scores() {
        let validator = ResponseValidator;
        for (text, expected) in [("45", 45), ("1", 1), ("100", 100), ("  72 \n", 72), ("+50", 50)] {
            assert_eq!(
                validator.validate(text),
                AttemptOutcome::Valid(Score::new(expected).unwrap()),
                "{text:?}"
            );
        }
    }

    #[test]
    fn test_invalid_answers() {
        let validator = ResponseValidator;
        for text in ["101", "0", "-5", "abc", "", "   ", "45.5", "45 points", "99999999999"] {
            assert!(
                matches!(validator.validate(text), AttemptOutcome::InvalidOutput(_)),
                "{text:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_interpret_reply_classes() {
        let validator = ResponseValidator;
        assert_eq!(
            validator.interpret(&ReplyClass::Completion("150".into())),
            AttemptOutcome::InvalidOutput("150 is outside 1..=100".into())
        );
        assert_eq!(
            validator.interpret(&ReplyClass::Malformed("no choices".into())),
            AttemptOutcome::Transient("no choices".into())
        );
        assert_eq!(
            validator.interpret(&ReplyClass::RateLimited {
                hint: Some(Duration::from_secs(3)),
                message: "slow down".into()
            }),
            AttemptOutcome::RateLimited {
                hint: Some(Duration::from_secs(3)),
                message: "slow down".into()
            }
        );
        assert_eq!(
            validator.interpret(&ReplyClass::Rejected {
                status: 401,
                message: "bad key".into()
            }),
            AttemptOutcome::Rejected("HTTP 401: bad key".into())
        );
    }
}
