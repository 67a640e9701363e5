use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::wikidata::{DEFAULT_API_URL, DEFAULT_SPARQL_URL};

pub const DEFAULT_ARCHIVE_URL: &str = "https://repository.clarin.dk/repository/xmlui/bitstream/handle/20.500.12115/25/DanNet-2.2_owl.zip";
pub const DEFAULT_ARCHIVE: &str = "dannet.zip";
pub const DEFAULT_CSV: &str = "words.csv";
pub const DEFAULT_USER_AGENT: &str = concat!(
    "LexDanNet/",
    env!("CARGO_PKG_VERSION"),
    " (https://www.wikidata.org/wiki/Wikidata:Tools/LexDanNet)"
);
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "lexdannet")]
#[command(about = "Link Danish Wikidata lexemes to DanNet 2.2 words")]
pub struct Cli {
    #[command(flatten)]
    pub dump: DumpArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the DanNet index and export it as CSV.
    Index,
    /// Build the index, then match lexemes missing a DanNet 2.2 ID.
    Run(RunArgs),
}

#[derive(Debug, Clone, Args)]
pub struct DumpArgs {
    /// Cached DanNet archive; downloaded when missing.
    #[arg(long, global = true, env = "DANNET_ARCHIVE", default_value = DEFAULT_ARCHIVE)]
    pub archive: PathBuf,
    #[arg(long, global = true, env = "DANNET_ARCHIVE_URL", default_value = DEFAULT_ARCHIVE_URL)]
    pub archive_url: String,
    /// Where the joined index is exported.
    #[arg(long, global = true, env = "DANNET_CSV", default_value = DEFAULT_CSV)]
    pub csv_out: PathBuf,
    #[arg(long, global = true, env = "LEXDANNET_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Wikidata bot-password user name (`User@BotName`).
    #[arg(long, env = "WIKIBASE_USER")]
    pub user: String,
    #[arg(long, env = "WIKIBASE_BOT_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long, env = "WIKIBASE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    #[arg(long, env = "WIKIBASE_SPARQL_URL", default_value = DEFAULT_SPARQL_URL)]
    pub sparql_url: String,
    /// Process only the first N candidates.
    #[arg(long)]
    pub limit: Option<usize>,
}

impl DumpArgs {
    /// HTTP agent shared by the archive download and the Wikibase session.
    pub fn agent(&self) -> ureq::Agent {
        ureq::AgentBuilder::new()
            .user_agent(&self.user_agent)
            .timeout(HTTP_TIMEOUT)
            .build()
    }
}

/// Log filter from `RUST_LOG`-style directives, falling back to `info` when
/// they are absent or invalid.
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn log_filter_keeps_per_target_levels() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(log_filter(Some("lexdannet=debug,ureq=warn")))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(target: "lexdannet::matcher", "matcher detail");
            tracing::info!(target: "ureq::unit", "connection chatter");
            tracing::warn!(target: "ureq::unit", "connection trouble");
        });

        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("matcher detail"));
        assert!(text.contains("connection trouble"));
        assert!(!text.contains("connection chatter"));
    }

    #[test]
    fn invalid_log_filter_falls_back_to_info() {
        assert_eq!(log_filter(Some("lexdannet=loud")).to_string(), "info");
        assert_eq!(log_filter(None).to_string(), "info");
    }

    #[test]
    fn index_uses_defaults() {
        let cli = Cli::try_parse_from(["lexdannet", "index"]).unwrap();
        assert!(matches!(cli.command, Command::Index));
        assert_eq!(cli.dump.csv_out, PathBuf::from(DEFAULT_CSV));
        assert!(cli.dump.user_agent.starts_with("LexDanNet/"));
    }

    #[test]
    fn run_takes_credentials_and_limit() {
        let cli = Cli::try_parse_from([
            "lexdannet",
            "run",
            "--user",
            "Example@LexDanNet",
            "--password",
            "secret",
            "--limit",
            "3",
            "--archive",
            "/tmp/dn.zip",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.user, "Example@LexDanNet");
        assert_eq!(args.limit, Some(3));
        assert_eq!(args.api_url, DEFAULT_API_URL);
        assert_eq!(cli.dump.archive, PathBuf::from("/tmp/dn.zip"));
    }
}
