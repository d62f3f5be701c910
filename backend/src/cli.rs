use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "spinmaster table tennis ranking backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Start the backend server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Create any missing tables in the configured database
    InitDb,
    /// Drop every table and recreate the schema (all data is lost)
    ResetDb,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["spinmaster_ranking", "serve", "--port", "8080"]).unwrap();
        assert_eq!(cli.command, Command::Serve { port: 8080 });

        let cli = Cli::try_parse_from(["spinmaster_ranking", "serve"]).unwrap();
        assert_eq!(cli.command, Command::Serve { port: 3000 });

        let cli = Cli::try_parse_from(["spinmaster_ranking", "init-db"]).unwrap();
        assert_eq!(cli.command, Command::InitDb);

        let cli = Cli::try_parse_from(["spinmaster_ranking", "reset-db"]).unwrap();
        assert_eq!(cli.command, Command::ResetDb);
    }
}
