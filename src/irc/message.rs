//! # Command Parser
//!
//! Turns one terminated line into an [`Event`]:
//!
//!   `:nick!user@host COMMAND middle... :trailing`  → [`Event::Message`]
//!   `:server 433 ...`                              → [`Event::Numeric`]
//!   `PING :token`                                  → [`Event::KeepAlive`]
//!
//! Anything else is a diagnostic [`Event::Unparsed`].
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Outbound line builder
//! - 1.1.0: Numeric reply table moved to `numeric`
//! - 1.0.0: Initial parser

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use super::numeric;

/// Keep-alive probe command sent by the server
pub const PROBE_COMMAND: &str = "PING";

static MASK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z0-9]+)!([^a-z0-9]?[a-z0-9]+)@(.+)$").expect("mask pattern is valid")
});

/// A user-originated line split into prefix, command and parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub prefix_nick: Option<String>,
    pub prefix_user: Option<String>,
    pub prefix_host: Option<String>,
    pub command: String,
    /// Parameters in order; the last one may be a trailing param with spaces.
    pub params: Vec<String>,
}

impl ParsedLine {
    /// Sender nickname, empty when the line had no prefix
    pub fn nick(&self) -> &str {
        self.prefix_nick.as_deref().unwrap_or_default()
    }

    /// First parameter: the recipient of a message or notice
    pub fn recipient(&self) -> &str {
        self.params.first().map(String::as_str).unwrap_or_default()
    }

    /// Everything after the recipient, rejoined with spaces
    pub fn text(&self) -> String {
        self.params.get(1..).unwrap_or_default().join(" ")
    }
}

/// Result of parsing one inbound line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A command from a user (`PRIVMSG`, `NOTICE`, `JOIN`, ...)
    Message(ParsedLine),
    /// Numeric reply from the server; diagnostic only
    Numeric {
        code: u32,
        meaning: Option<&'static str>,
        line: String,
    },
    /// Keep-alive probe; `reply` must be sent back verbatim
    KeepAlive { reply: String },
    /// Line with no recognised shape; diagnostic only
    Unparsed(String),
    /// Blank line between terminators
    Empty,
}

/// Parse one line (terminator already stripped)
pub fn parse(line: &str) -> Event {
    if line.is_empty() {
        return Event::Empty;
    }

    if line.starts_with(':') {
        return parse_prefixed(line);
    }

    if line.split(' ').next() == Some(PROBE_COMMAND) {
        return match keepalive_reply(line) {
            Some(reply) => Event::KeepAlive { reply },
            None => Event::Unparsed(line.to_string()),
        };
    }

    Event::Unparsed(line.to_string())
}

fn parse_prefixed(line: &str) -> Event {
    let mut tokens = line.split(' ');
    let prefix = tokens.next().unwrap_or_default();

    if !prefix.contains('!') {
        return parse_numeric(line, tokens.next());
    }

    let mask = prefix
        .strip_prefix(':')
        .or_else(|| prefix.strip_prefix('~'))
        .unwrap_or(prefix);

    let (prefix_nick, prefix_user, prefix_host) = match MASK_RE.captures(mask) {
        Some(caps) => (
            Some(caps[1].to_string()),
            Some(caps[2].to_string()),
            Some(caps[3].to_string()),
        ),
        None => (Some(mask.to_string()), None, None),
    };

    let command = match tokens.next() {
        Some(command) if !command.is_empty() => command.to_string(),
        _ => return Event::Unparsed(line.to_string()),
    };

    let mut params = Vec::new();
    while let Some(token) = tokens.next() {
        if let Some(first) = token.strip_prefix(':') {
            let trailing = std::iter::once(first)
                .chain(tokens.by_ref())
                .collect::<Vec<_>>()
                .join(" ");
            params.push(trailing);
            break;
        }
        if !token.is_empty() {
            params.push(token.to_string());
        }
    }

    Event::Message(ParsedLine {
        prefix_nick,
        prefix_user,
        prefix_host,
        command,
        params,
    })
}

fn parse_numeric(line: &str, code: Option<&str>) -> Event {
    match code.and_then(|c| c.parse::<u32>().ok()) {
        Some(code) => Event::Numeric {
            code,
            meaning: numeric::describe(code),
            line: line.to_string(),
        },
        None => Event::Unparsed(line.to_string()),
    }
}

/// Build the acknowledgment for a keep-alive probe.
///
/// The second character becomes `O` (`PING` → `PONG`); the rest is kept.
/// Returns `None` for lines too short to transform.
pub fn keepalive_reply(line: &str) -> Option<String> {
    let head = line.get(..1)?;
    let tail = line.get(2..)?;
    Some(format!("{head}O{tail}"))
}

/// An outgoing command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundLine {
    pub command: String,
    pub params: Vec<String>,
    /// Final parameter, always written after the `:` marker
    pub trailing: Option<String>,
}

impl OutboundLine {
    fn new(command: &str, params: &[&str], trailing: Option<&str>) -> Self {
        OutboundLine {
            command: command.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            trailing: trailing.map(str::to_string),
        }
    }

    pub fn privmsg(to: &str, text: &str) -> Self {
        Self::new("PRIVMSG", &[to], Some(text))
    }

    pub fn nick(nickname: &str) -> Self {
        Self::new("NICK", &[nickname], None)
    }

    /// Registration line using the nickname for every free-text field
    pub fn user(nickname: &str, peer: &str) -> Self {
        Self::new("USER", &[nickname, nickname, peer], Some(nickname))
    }

    pub fn mode(target: &str, flags: &str) -> Self {
        Self::new("MODE", &[target, flags], None)
    }

    pub fn join(channel: &str, password: Option<&str>) -> Self {
        match password.filter(|p| !p.is_empty()) {
            Some(password) => Self::new("JOIN", &[channel, password], None),
            None => Self::new("JOIN", &[channel], None),
        }
    }

    /// Serialize to wire format (without `\r\n`)
    pub fn to_wire(&self) -> String {
        let mut out = self.command.clone();
        for param in &self.params {
            out.push(' ');
            out.push_str(param);
        }
        if let Some(ref trailing) = self.trailing {
            out.push_str(" :");
            out.push_str(trailing);
        }
        out
    }
}

impl fmt::Display for OutboundLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}
