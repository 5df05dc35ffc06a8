use clap::{Parser, Subcommand};

/// Ballot for the 2024 nominations: vote once, follow the countdown, see the results.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON settings file. See the manual of the
    /// nomination_ballot crate for the list of fields.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, default votes.json) Where the ballot is stored. Overrides the
    /// storagePath setting.
    #[clap(short, long, value_parser)]
    pub storage: Option<String>,

    /// (file path, optional) A JSON catalog of nominations to use instead of the
    /// built-in one. Overrides the catalogPath setting.
    #[clap(long, value_parser)]
    pub catalog: Option<String>,

    /// (any text, optional) Makes the synthetic results reproducible: the same
    /// seed always gives the same counts.
    #[clap(long, value_parser)]
    pub seed: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Shows the ballot with the current choices.
    Ballot,
    /// Lists the nominations and their options.
    Nominations,
    /// Chooses an option (label or 1-based position) for a nomination.
    Select {
        #[clap(value_parser)]
        nomination: String,
        #[clap(value_parser)]
        option: String,
    },
    /// Submits the ballot. Every nomination needs a choice.
    Submit,
    /// Shows the results.
    Results,
    /// Shows the time left before the end of the vote.
    Countdown {
        /// Keeps refreshing until the end of the vote or Ctrl-C.
        #[clap(long, takes_value = false)]
        watch: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select() {
        let args = Args::parse_from(["vote", "--verbose", "select", "3", "Платформа EduTech"]);
        assert!(args.verbose);
        assert_eq!(
            args.command,
            Command::Select {
                nomination: "3".to_string(),
                option: "Платформа EduTech".to_string()
            }
        );
    }

    #[test]
    fn parses_countdown_watch() {
        let args = Args::parse_from(["vote", "-s", "x.json", "countdown", "--watch"]);
        assert_eq!(args.storage, Some("x.json".to_string()));
        assert_eq!(args.command, Command::Countdown { watch: true });
    }

    #[test]
    fn command_is_required() {
        assert!(Args::try_parse_from(["vote"]).is_err());
    }
}
