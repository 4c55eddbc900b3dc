use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use voterdb_core::types::SearchMethod;

#[derive(Debug, Parser)]
#[command(name = "voterdb", version, about = "Ward-scoped voter roll lookup")]
pub struct Cli {
    /// Search a JSON roll export instead of Postgres.
    #[arg(long, global = true, env = "VOTERDB_DATA")]
    pub data: Option<PathBuf>,

    /// Directory holding config.toml and config.<env>.toml.
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find voters by name, EPIC number or booth.
    Search(SearchArgs),
    /// Show one voter with their polling station.
    Details(DetailsArgs),
    /// List valid wards, or resolve a named ward set.
    Wards {
        set: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub ward: String,

    /// name (1), epic (2), booth (3) or house (4).
    #[arg(long, short, default_value = "name")]
    pub method: SearchMethod,

    #[arg(long, short, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    #[arg(long, value_enum, default_value_t = Lang::En)]
    pub lang: Lang,

    /// Entries in the chat list.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,
}

impl SearchArgs {
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }
}

#[derive(Debug, Args)]
pub struct DetailsArgs {
    #[arg(long)]
    pub ward: String,

    #[arg(long, short, value_enum, default_value_t = DetailsFormat::Json)]
    pub format: DetailsFormat,

    pub epic: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Chat,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DetailsFormat {
    Json,
    Slip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Lang {
    #[value(alias = "english")]
    En,
    #[value(alias = "hindi")]
    Hi,
    #[value(alias = "marathi")]
    Mr,
}

impl Command {
    /// Whether failures should be reported as a JSON error body.
    pub fn wants_json(&self) -> bool {
        match self {
            Command::Search(args) => args.format == Format::Json,
            Command::Details(args) => args.format == DetailsFormat::Json,
            Command::Wards { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_accepts_numeric_methods_and_multi_word_queries() {
        let cli = Cli::try_parse_from(["voterdb", "search", "--ward", "146", "-m", "2", "nct6342834"]).unwrap();
        let Command::Search(args) = cli.command else { panic!("expected search") };
        assert_eq!(args.method, SearchMethod::Epic);
        assert_eq!(args.format, Format::Json);

        let cli = Cli::try_parse_from(["voterdb", "search", "--ward", "146", "Ram", "Kumar"]).unwrap();
        let Command::Search(args) = cli.command else { panic!("expected search") };
        assert_eq!(args.method, SearchMethod::Name);
        assert_eq!(args.query_text(), "Ram Kumar");
    }

    #[test]
    fn language_aliases_and_global_flags() {
        let cli = Cli::try_parse_from([
            "voterdb", "search", "--ward", "146", "--format", "chat", "--lang", "marathi", "Ram", "--data", "roll.json",
        ])
        .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("roll.json")));
        let Command::Search(args) = cli.command else { panic!("expected search") };
        assert_eq!(args.lang, Lang::Mr);
        assert!(!Command::Search(args).wants_json());
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(Cli::try_parse_from(["voterdb", "search", "--ward", "146", "-m", "phone", "Ram"]).is_err());
    }
}
