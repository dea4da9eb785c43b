use clap::{Args, Parser, Subcommand};

use crate::models::SearchFilter;

#[derive(Parser)]
#[command(name = "paperdesk")]
#[command(about = "Browse, filter, and download exam papers from a resource archive")]
#[command(version)]
pub struct Cli {
    /// Base URL of the paper archive (overrides PAPERDESK_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every paper the archive serves
    List,

    /// Search papers by course, session, subject and semester
    Search {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Download a paper by title
    Download {
        /// Paper title (case-insensitive)
        #[arg(short, long)]
        name: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output directory (overrides PAPERDESK_DOWNLOAD_DIR)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Launch the interactive terminal UI
    Tui,
}

/// Search form values as command-line flags
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Course code, e.g. btech
    #[arg(short, long, default_value = "")]
    pub course: String,

    /// Session, e.g. 2023
    #[arg(short, long, default_value = "")]
    pub session: String,

    /// Subject text
    #[arg(long, default_value = "")]
    pub subject: String,

    /// Semester
    #[arg(long, default_value = "")]
    pub semester: String,
}

impl From<FilterArgs> for SearchFilter {
    fn from(args: FilterArgs) -> Self {
        SearchFilter {
            course: args.course,
            session: args.session,
            subject: args.subject,
            semester: args.semester,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_flags() {
        let cli = Cli::parse_from([
            "paperdesk", "search", "--course", "btech", "--session", "2023",
            "--subject", "Data", "--semester", "1",
        ]);
        match cli.command {
            Some(Commands::Search { filter }) => {
                let filter = SearchFilter::from(filter);
                assert_eq!(filter.course, "btech");
                assert_eq!(filter.subject, "Data");
                assert_eq!(filter.semester, "1");
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::parse_from(["paperdesk", "--base-url", "http://localhost:9000"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:9000"));
    }
}
