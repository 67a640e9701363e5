use std::env;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use dannet_dump::{DumpPayloads, LexicalIndex, RegexDumpParser, ensure_archive};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lexdannet::config::{DumpArgs, RunArgs, log_filter};
use lexdannet::{
    CandidateSource, Cli, Command, ConsoleOperator, Matcher, SparqlCandidateSource,
    WikibaseClient,
};

const SPOT_CHECK: (&str, &str, &str) = ("11010114", "dyr", "Noun");

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let agent = cli.dump.agent();
    let index = load_index(&agent, &cli.dump)?;

    match cli.command {
        Command::Index => Ok(()),
        Command::Run(args) => run(agent, &index, &args),
    }
}

fn load_index(agent: &ureq::Agent, args: &DumpArgs) -> anyhow::Result<LexicalIndex> {
    if ensure_archive(agent, &args.archive_url, &args.archive)
        .with_context(|| format!("fetching {}", args.archive_url))?
    {
        info!("downloaded DanNet archive to {}", args.archive.display());
    }

    let start = Instant::now();
    let payloads = DumpPayloads::from_archive(&args.archive)
        .with_context(|| format!("reading {}", args.archive.display()))?;
    let index = payloads
        .build_index(&RegexDumpParser::new())
        .context("building DanNet index")?;
    info!(
        "index of {} words built in {} ms",
        index.len(),
        start.elapsed().as_millis()
    );

    index
        .write_csv(&args.csv_out)
        .with_context(|| format!("writing {}", args.csv_out.display()))?;
    info!("wrote {}", args.csv_out.display());

    let (id, form, pos) = SPOT_CHECK;
    if !index.spot_check(id, form, pos) {
        warn!("spot check failed: expected word-{} to be {} ({})", id, form, pos);
    }
    for (pos, count) in index.pos_counts() {
        info!("{:>8} {}", count, pos);
    }
    Ok(index)
}

fn run(agent: ureq::Agent, index: &LexicalIndex, args: &RunArgs) -> anyhow::Result<()> {
    let client = WikibaseClient::login(agent.clone(), &args.api_url, &args.user, &args.password)
        .with_context(|| format!("logging in to {}", args.api_url))?;
    info!("logged in as {}", args.user);

    let mut candidates = SparqlCandidateSource::new(agent, &args.sparql_url)
        .fetch_missing_link_candidates()
        .context("querying for unlinked lexemes")?;
    info!("{} lexemes without a DanNet 2.2 ID", candidates.len());
    if let Some(limit) = args.limit {
        candidates.truncate(limit);
    }

    let mut operator = ConsoleOperator::stdio();
    let summary = Matcher::new(index, &client, &mut operator).run(&candidates)?;
    info!("done: {}", summary);
    Ok(())
}

fn init_tracing() {
    let directives = env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}
