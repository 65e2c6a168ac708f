use chrono::NaiveDate;
use tickerlab_core::dates::parse_date_token;

/// Prefix that switches a turn into context mode.
pub const NEWS_PREFIX: &str = "news";

/// What a line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `exit` or `quit`.
    Exit,
    /// Blank input.
    Empty,
    /// `news [date] question`: answer with CSV rows as context.
    News {
        date: Option<NaiveDate>,
        question: String,
    },
    /// Anything else, sent as typed.
    Plain(String),
}

/// Classify one line. Keywords are case-insensitive; the date token is the
/// first word after `news` when it parses as `YYYY-MM-DD` or `YYYYMMDD`.
pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    let lower = trimmed.to_lowercase();
    if lower == "exit" || lower == "quit" {
        return Command::Exit;
    }

    let mut words = trimmed.splitn(2, char::is_whitespace);
    let first = words.next().unwrap_or("");
    let rest = words.next().map(str::trim).unwrap_or("");
    if !first.eq_ignore_ascii_case(NEWS_PREFIX) || rest.is_empty() {
        return Command::Plain(trimmed.to_string());
    }

    let mut parts = rest.splitn(2, char::is_whitespace);
    let token = parts.next().unwrap_or("");
    match parse_date_token(token) {
        Some(date) => Command::News {
            date: Some(date),
            question: parts.next().map(str::trim).unwrap_or("").to_string(),
        },
        None => Command::News {
            date: None,
            question: rest.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_words() {
        assert_eq!(parse_command("exit"), Command::Exit);
        assert_eq!(parse_command("  QUIT "), Command::Exit);
        assert_eq!(parse_command("   "), Command::Empty);
    }

    #[test]
    fn dated_news() {
        assert_eq!(
            parse_command("news 2024-01-02 what happened?"),
            Command::News {
                date: NaiveDate::from_ymd_opt(2024, 1, 2),
                question: "what happened?".into()
            }
        );
        assert_eq!(
            parse_command("NEWS 20240102 why"),
            Command::News {
                date: NaiveDate::from_ymd_opt(2024, 1, 2),
                question: "why".into()
            }
        );
    }

    #[test]
    fn undated_news_keeps_whole_question() {
        assert_eq!(
            parse_command("news which stock looks best"),
            Command::News {
                date: None,
                question: "which stock looks best".into()
            }
        );
    }

    #[test]
    fn news_prefix_must_be_a_word() {
        assert_eq!(parse_command("newsletter ideas"), Command::Plain("newsletter ideas".into()));
        assert_eq!(parse_command("news"), Command::Plain("news".into()));
        assert_eq!(parse_command("hello there"), Command::Plain("hello there".into()));
    }
}
