//! Numeric server reply codes
//!
//! Only the error replies the bot cares about are named; everything else is
//! logged raw.

/// Diagnostic text for a numeric reply code
pub fn describe(code: u32) -> Option<&'static str> {
    let meaning = match code {
        376 => "identification needed",
        401 => "no such nick/channel",
        403 => "no such channel",
        404 => "cannot send text to channel",
        405 => "too many channels joined",
        407 => "duplicate entries",
        421 => "unknown command",
        431 => "no nick given",
        432 => "erroneous nickname",
        433 => "nick already in use",
        436 => "nickname collision",
        442 => "not on that channel",
        451 => "not registered",
        461 => "not enough parameters",
        464 => "password incorrect",
        471 => "channel full",
        473 => "invite only",
        474 => "banned",
        475 => "needs password",
        481 => "not an operator",
        482 => "not a channel operator",
        _ => return None,
    };
    Some(meaning)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(describe(376), Some("identification needed"));
        assert_eq!(describe(433), Some("nick already in use"));
        assert_eq!(describe(482), Some("not a channel operator"));
    }

    #[test]
    fn test_unknown_codes() {
        assert_eq!(describe(1), None);
        assert_eq!(describe(372), None);
        assert_eq!(describe(999), None);
    }
}
