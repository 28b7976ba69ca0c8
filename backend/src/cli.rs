#[derive(Debug, clap::Parser)]
#[command(about = "Stores shooter match logs and serves statistics about them")]
pub struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Matches with more distinct players are stored but flagged as invalid
    #[arg(long, default_value_t = fraglog::MAX_PLAYERS_PER_MATCH)]
    pub max_players: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Eq, clap::Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        bind: String,
    },
    /// Ingest a single log file and print the result
    Ingest { file: std::path::PathBuf },
}

impl Cli {
    pub fn ingest_config(&self) -> fraglog::IngestConfig {
        fraglog::IngestConfig {
            max_players_per_match: self.max_players,
        }
    }
}
