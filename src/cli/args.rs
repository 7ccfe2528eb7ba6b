//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::application::services::{Key, QuizEvent};

/// Decision-tree personality quiz: take the quiz, inspect and validate trees
#[derive(Parser, Debug)]
#[command(name = "typequiz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Decision tree document (default: configured tree_path, then bundled tree)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub tree: Option<PathBuf>,

    /// Display locale (falls back to the default locale when unsupported)
    #[arg(short, long, global = true)]
    pub locale: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Take the quiz interactively
    ///
    /// Enter an option number to answer, an empty line for the first option,
    /// `b` to go back, `r` to restart and `q` to quit.
    Run,

    /// Replay a fixed sequence of answers and print where it ends
    Play {
        /// Steps: option index, `back`, `restart`, `enter` or `left`
        #[arg(value_parser = parse_event, num_args = 1.., allow_hyphen_values = true)]
        steps: Vec<QuizEvent>,
    },

    /// Check tree integrity
    Validate,

    /// Show the decision tree
    Tree,

    /// Show a result by type code
    Result {
        /// Type code, e.g. INTJ
        code: String,
    },

    /// List the 16 personality types
    Types,

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

/// Parse one quiz step as typed on the command line or at the prompt.
pub fn parse_event(s: &str) -> Result<QuizEvent, String> {
    let s = s.trim();
    match s.to_ascii_lowercase().as_str() {
        "" | "enter" => Ok(QuizEvent::Key(Key::Enter)),
        "left" => Ok(QuizEvent::Key(Key::ArrowLeft)),
        "b" | "back" => Ok(QuizEvent::Back),
        "r" | "restart" => Ok(QuizEvent::Restart),
        other => other
            .parse::<usize>()
            .map(QuizEvent::Select)
            .map_err(|_| format!("invalid step '{s}': expected an option index, back, restart, enter or left")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case("0", QuizEvent::Select(0))]
    #[case(" 12 ", QuizEvent::Select(12))]
    #[case("", QuizEvent::Key(Key::Enter))]
    #[case("Enter", QuizEvent::Key(Key::Enter))]
    #[case("left", QuizEvent::Key(Key::ArrowLeft))]
    #[case("b", QuizEvent::Back)]
    #[case("BACK", QuizEvent::Back)]
    #[case("restart", QuizEvent::Restart)]
    fn given_step_text_when_parsing_then_event(#[case] input: &str, #[case] expected: QuizEvent) {
        assert_eq!(parse_event(input), Ok(expected));
    }

    #[rstest]
    #[case("-1")]
    #[case("first")]
    fn given_invalid_step_when_parsing_then_error(#[case] input: &str) {
        assert!(parse_event(input).is_err());
    }

    #[test]
    fn given_play_steps_when_parsing_cli_then_collects_events() {
        let cli = Cli::try_parse_from(["typequiz", "-l", "es", "play", "0", "back", "1"]).unwrap();
        assert_eq!(cli.locale.as_deref(), Some("es"));
        match cli.command {
            Some(Commands::Play { steps }) => assert_eq!(
                steps,
                vec![QuizEvent::Select(0), QuizEvent::Back, QuizEvent::Select(1)]
            ),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
