//! REPL input parsing

use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  /new             start a new chat
  /list            list chats, newest first (* marks the current one)
  /switch <id>     make another chat current
  /delete <id>     delete a chat
  /attach <path>   attach a SQLite .db file to the next question
  /detach          drop the pending attachment
  /history         show the current chat
  /help            show this help
  /quit            save and exit
Anything else is sent to the agent as a question.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    New,
    List,
    Switch(String),
    Delete(String),
    Attach(PathBuf),
    Detach,
    History,
    Help,
    Quit,
    /// A slash command that is unknown or missing its argument
    Invalid(String),
}

impl Command {
    /// `None` for blank lines
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(Command::Ask(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match (name, arg.is_empty()) {
            ("new", _) => Command::New,
            ("list", _) => Command::List,
            ("detach", _) => Command::Detach,
            ("history", _) => Command::History,
            ("help", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            ("switch", false) => Command::Switch(arg.to_string()),
            ("delete", false) => Command::Delete(arg.to_string()),
            ("attach", false) => Command::Attach(PathBuf::from(arg)),
            ("switch" | "delete" | "attach", true) => {
                Command::Invalid(format!("/{} needs an argument", name))
            }
            _ => Command::Invalid(format!("Unknown command /{}", name)),
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_question() {
        assert_eq!(
            Command::parse("  How many invoices were issued in 2013? "),
            Some(Command::Ask("How many invoices were issued in 2013?".into()))
        );
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            Command::parse("/switch 1718000000000"),
            Some(Command::Switch("1718000000000".into()))
        );
        assert_eq!(
            Command::parse("/attach  data/chinook.db "),
            Some(Command::Attach(PathBuf::from("data/chinook.db")))
        );
        assert_eq!(Command::parse("/delete 42"), Some(Command::Delete("42".into())));
    }

    #[test]
    fn test_missing_argument() {
        assert_eq!(
            Command::parse("/switch"),
            Some(Command::Invalid("/switch needs an argument".into()))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            Command::parse("/drop table"),
            Some(Command::Invalid("Unknown command /drop".into()))
        );
        assert_eq!(Command::parse("/exit"), Some(Command::Quit));
    }
}
