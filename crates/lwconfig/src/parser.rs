//! Parser for `lwconfig --dump` output.
//!
//! The dump prints one record per line, name first, then whitespace,
//! then the value:
//! ```text
//! AssumeDefaultDomain true
//! HomeDirTemplate "%H/local/%D/%U"
//! LoginShellTemplate "/bin/bash"
//! RequireMembershipOf "CORP\\linux-admins"
//! ```
//!
//! A value starting with `"` is quoted: `\` escapes the next character and
//! the value may run over several lines until the closing quote. Any other
//! value is the rest of the line, taken verbatim.
//!
//! Parsing never fails outright. A malformed record stops the parse and
//! the records read so far are returned alongside a [`Diagnostic`].

use crate::types::Settings;
use std::fmt;

/// Why a dump record could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The record line has a name but no value field
    MissingValue,
    /// Input ended inside a quoted value
    UnterminatedQuote,
    /// An unescaped quote appeared before the end of a line
    StrayQuote,
    /// A backslash was the last character of a line
    DanglingEscape,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MissingValue => "missing value",
            Self::UnterminatedQuote => "unterminated quoted value",
            Self::StrayQuote => "unescaped quote inside value",
            Self::DanglingEscape => "backslash at end of line",
        };
        f.write_str(msg)
    }
}

/// Details about a malformed dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Line (1-indexed) where the failing record starts
    pub line: usize,
    /// What went wrong
    pub kind: ParseErrorKind,
    /// Name of the record being parsed, when it was read
    pub key: Option<String>,
    /// Command whose output was being parsed
    pub command: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to parse output of: {} (line {}: {}",
            self.command, self.line, self.kind
        )?;
        if let Some(key) = &self.key {
            write!(f, " for {key}")?;
        }
        f.write_str(")")
    }
}

/// Result of parsing a dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Every record parsed
    Complete(Settings),
    /// Parsing stopped at a malformed record
    Partial {
        /// Records parsed before the malformed one
        settings: Settings,
        /// What went wrong
        diagnostic: Diagnostic,
    },
}

impl ParseOutcome {
    /// Settings that were parsed, complete or not.
    pub fn settings(&self) -> &Settings {
        match self {
            Self::Complete(settings) | Self::Partial { settings, .. } => settings,
        }
    }

    /// The diagnostic, if parsing stopped early.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Complete(_) => None,
            Self::Partial { diagnostic, .. } => Some(diagnostic),
        }
    }

    /// Whether every record parsed.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    /// Split into the settings and the optional diagnostic.
    pub fn into_parts(self) -> (Settings, Option<Diagnostic>) {
        match self {
            Self::Complete(settings) => (settings, None),
            Self::Partial {
                settings,
                diagnostic,
            } => (settings, Some(diagnostic)),
        }
    }
}

/// Parse the output of a dump command.
///
/// `command` is only used to label the [`Diagnostic`]. When a name appears
/// twice the later value wins and a warning is logged.
pub fn parse_dump(output: &str, command: &str) -> ParseOutcome {
    let mut settings = Settings::new();
    let mut lines = output.split_inclusive('\n').enumerate();

    let fail = |settings: Settings, line: usize, kind: ParseErrorKind, key: Option<&str>| {
        ParseOutcome::Partial {
            settings,
            diagnostic: Diagnostic {
                line,
                kind,
                key: key.map(str::to_string),
                command: command.to_string(),
            },
        }
    };

    while let Some((index, raw)) = lines.next() {
        let line_num = index + 1;
        let line = chomp(raw);

        if line.trim().is_empty() {
            continue;
        }

        let Some((name, token)) = split_record(line) else {
            return fail(
                settings,
                line_num,
                ParseErrorKind::MissingValue,
                Some(line.trim()),
            );
        };

        let value = if let Some(mut part) = token.strip_prefix('"') {
            let mut value = String::new();
            loop {
                match scan_quoted(part, &mut value) {
                    Ok(true) => break,
                    Ok(false) => match lines.next() {
                        Some((_, next)) => {
                            value.push('\n');
                            part = chomp(next);
                        }
                        None => {
                            return fail(
                                settings,
                                line_num,
                                ParseErrorKind::UnterminatedQuote,
                                Some(name),
                            );
                        }
                    },
                    Err(kind) => return fail(settings, line_num, kind, Some(name)),
                }
            }
            value
        } else {
            token.to_string()
        };

        if settings.insert(name, value).is_some() {
            log::warn!("setting {name} appears more than once in {command}; keeping the last value");
        }
    }

    ParseOutcome::Complete(settings)
}

/// Strip one line terminator (`\n` or `\r\n`).
fn chomp(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Split a record line into name and value token on the first whitespace run.
fn split_record(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start();
    let split = line.find(char::is_whitespace)?;
    let (name, rest) = line.split_at(split);
    Some((name, rest.trim_start()))
}

/// Consume one line of a quoted value, unescaping into `value`.
///
/// Returns `Ok(true)` when the closing quote ends the line and `Ok(false)`
/// when the value continues on the next line.
fn scan_quoted(part: &str, value: &mut String) -> Result<bool, ParseErrorKind> {
    let mut chars = part.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => value.push(escaped),
                None => return Err(ParseErrorKind::DanglingEscape),
            },
            '"' if chars.as_str().is_empty() => return Ok(true),
            '"' => return Err(ParseErrorKind::StrayQuote),
            other => value.push(other),
        }
    }
    Ok(false)
}

/// Quote a value the way the dump prints string settings.
pub fn quote_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if c == '\\' || c == '"' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Render settings in dump format, every value quoted.
///
/// The output parses back to the same settings with [`parse_dump`].
pub fn write_dump(settings: &Settings) -> String {
    let mut out = String::new();
    for (name, value) in settings.iter() {
        out.push_str(name);
        out.push(' ');
        out.push_str(&quote_value(value));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMD: &str = "lwconfig --dump";

    fn complete(output: &str) -> Settings {
        match parse_dump(output, CMD) {
            ParseOutcome::Complete(settings) => settings,
            ParseOutcome::Partial { diagnostic, .. } => panic!("unexpected {diagnostic}"),
        }
    }

    #[test]
    fn test_parse_plain_and_quoted() {
        let settings = complete(
            "AssumeDefaultDomain true\n\
             HomeDirTemplate \"%H/local/%D/%U\"\n\
             LoginShellTemplate \"/bin/bash\"\n",
        );
        assert_eq!(settings.len(), 3);
        assert_eq!(settings.get("AssumeDefaultDomain"), Some("true"));
        assert_eq!(settings.get("HomeDirTemplate"), Some("%H/local/%D/%U"));
        assert_eq!(settings.get("LoginShellTemplate"), Some("/bin/bash"));
    }

    #[test]
    fn test_plain_value_keeps_inner_whitespace() {
        let settings = complete("Banner  hello   world \r\n");
        assert_eq!(settings.get("Banner"), Some("hello   world "));
    }

    #[test]
    fn test_last_line_without_newline() {
        let settings = complete("a 1\nb \"two\"");
        assert_eq!(settings.get("a"), Some("1"));
        assert_eq!(settings.get("b"), Some("two"));
    }

    #[test]
    fn test_empty_input() {
        assert!(complete("").is_empty());
        assert!(complete("\n\n").is_empty());
    }

    #[test]
    fn test_unescape_every_escaped_character() {
        let settings = complete("k \"a\\\"b\\\"c\"\n");
        assert_eq!(settings.get("k"), Some("a\"b\"c"));

        let settings = complete("k \"C:\\\\dir\\q\"\n");
        assert_eq!(settings.get("k"), Some("C:\\dirq"));
    }

    #[test]
    fn test_multi_line_quoted_value() {
        let settings = complete("motd \"line1\n continuation\"\nnext 1\n");
        assert_eq!(settings.get("motd"), Some("line1\n continuation"));
        assert_eq!(settings.get("next"), Some("1"));
    }

    #[test]
    fn test_quoted_single_line() {
        assert_eq!(complete("k \"abc\"\n").get("k"), Some("abc"));
        assert_eq!(complete("k \"\"\n").get("k"), Some(""));
    }

    #[test]
    fn test_partial_on_unterminated_quote() {
        let outcome = parse_dump("a foo\nb \"unterminated", CMD);
        let (settings, diagnostic) = outcome.into_parts();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings.get("a"), Some("foo"));
        let diagnostic = diagnostic.expect("diagnostic");
        assert_eq!(diagnostic.kind, ParseErrorKind::UnterminatedQuote);
        assert_eq!(diagnostic.line, 2);
        assert_eq!(diagnostic.key.as_deref(), Some("b"));
        assert!(diagnostic.to_string().contains("lwconfig --dump"));
    }

    #[test]
    fn test_partial_on_missing_value() {
        let outcome = parse_dump("a 1\nlonely\nc 3\n", CMD);
        assert!(!outcome.is_complete());
        assert_eq!(outcome.settings().get("a"), Some("1"));
        assert!(!outcome.settings().contains("c"));
        let diagnostic = outcome.diagnostic().expect("diagnostic");
        assert_eq!(diagnostic.kind, ParseErrorKind::MissingValue);
        assert_eq!(diagnostic.key.as_deref(), Some("lonely"));
    }

    #[test]
    fn test_partial_on_stray_quote() {
        let outcome = parse_dump("a 1\nb \"x\"y\"\n", CMD);
        assert_eq!(
            outcome.diagnostic().map(|d| d.kind),
            Some(ParseErrorKind::StrayQuote)
        );
        assert_eq!(outcome.settings().len(), 1);
    }

    #[test]
    fn test_escaped_backslash_does_not_escape_quote() {
        // "a\\"b" closes after the escaped backslash, leaving b" behind
        let outcome = parse_dump("k \"a\\\\\"b\"\n", CMD);
        assert_eq!(
            outcome.diagnostic().map(|d| d.kind),
            Some(ParseErrorKind::StrayQuote)
        );
    }

    #[test]
    fn test_partial_on_dangling_escape() {
        let outcome = parse_dump("b \"x\\\nmore\"\n", CMD);
        assert_eq!(
            outcome.diagnostic().map(|d| d.kind),
            Some(ParseErrorKind::DanglingEscape)
        );
        assert!(outcome.settings().is_empty());
    }

    #[test]
    fn test_duplicate_name_last_wins() {
        let settings = complete("k first\nk \"second\"\n");
        assert_eq!(settings.len(), 1);
        assert_eq!(settings.get("k"), Some("second"));
    }

    #[test]
    fn test_empty_plain_value() {
        assert_eq!(complete("k \n").get("k"), Some(""));
    }

    #[test]
    fn test_quote_value() {
        assert_eq!(quote_value("plain"), "\"plain\"");
        assert_eq!(quote_value("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn test_write_dump_parses_back() {
        let original: Settings = [
            ("Backslashes", "CORP\\admins\\"),
            ("Quotes", "say \"hi\""),
            ("Multi", "first\nsecond\n"),
            ("Empty", ""),
            ("Mixed", "\\\"\n\"\\"),
        ]
        .into_iter()
        .collect();

        let dumped = write_dump(&original);
        assert_eq!(complete(&dumped), original);
    }
}
