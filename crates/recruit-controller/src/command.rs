//! Typed parsing helpers for the operator command surface.
//!
//! The slash-command layer stays thin: it hands raw strings here and routes
//! the typed results to the dispatcher. Malformed input is a `Validation`
//! error with text safe to echo back.

use crate::errors::RecruitError;
use common::types::{SessionId, UserId};

/// Parse a `<@123>` or `<@!123>` user mention.
pub fn parse_user_mention(input: &str) -> Result<UserId, RecruitError> {
    let trimmed = input.trim();
    let inner = trimmed
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .ok_or_else(|| invalid_mention(trimmed))?;
    let digits = inner.strip_prefix('!').unwrap_or(inner);
    if digits.is_empty() {
        return Err(invalid_mention(trimmed));
    }
    digits
        .parse::<u64>()
        .map(UserId)
        .map_err(|_| invalid_mention(trimmed))
}

/// Parse a numeric session identifier.
pub fn parse_session_id(input: &str) -> Result<SessionId, RecruitError> {
    let trimmed = input.trim();
    trimmed.parse::<u64>().map(SessionId).map_err(|_| {
        RecruitError::Validation(format!(
            "Invalid session id '{trimmed}'. Enter the numeric id shown on the recruitment message."
        ))
    })
}

fn invalid_mention(input: &str) -> RecruitError {
    RecruitError::Validation(format!(
        "Invalid user mention '{input}'. Expected the form <@123456789>."
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_mention() {
        assert_eq!(parse_user_mention("<@123456789>").unwrap(), UserId(123_456_789));
    }

    #[test]
    fn test_parse_nickname_mention() {
        assert_eq!(parse_user_mention("<@!42>").unwrap(), UserId(42));
    }

    #[test]
    fn test_parse_mention_trims_whitespace() {
        assert_eq!(parse_user_mention("  <@7>  ").unwrap(), UserId(7));
    }

    #[test]
    fn test_parse_mention_rejects_junk() {
        for input in ["@someone", "<@>", "<@!>", "<@12a3>", "123", "<#123>"] {
            assert!(
                matches!(parse_user_mention(input), Err(RecruitError::Validation(_))),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_parse_session_id_numeric_only() {
        assert_eq!(parse_session_id(" 998877 ").unwrap(), SessionId(998_877));
        assert!(matches!(
            parse_session_id("not-a-number"),
            Err(RecruitError::Validation(_))
        ));
        assert!(matches!(
            parse_session_id(""),
            Err(RecruitError::Validation(_))
        ));
    }
}
