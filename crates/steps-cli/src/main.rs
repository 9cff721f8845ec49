mod output;

use clap::Parser;
use std::path::PathBuf;
use steps_core::{
    client::{StudioClient, DEFAULT_BASE_URL},
    credentials, report,
    window::TimeWindow,
    StepsError,
};

#[derive(Parser)]
#[command(
    name = "studio-steps",
    about = "Creates a CSV file of steps within engagements in a Twilio Studio flow, for the given \
             time period, for the purposes of analyzing paths through an IVR",
    version
)]
struct Cli {
    /// Flow SID
    #[arg(value_name = "FLOW")]
    flow: String,

    /// yyyy-mm-dd [HH:MM[:SS]]; time defaults to 00:00:00
    #[arg(long)]
    after: Option<String>,

    /// yyyy-mm-dd [HH:MM[:SS]]; time defaults to 00:00:00
    #[arg(long, short = 'b')]
    before: Option<String>,

    /// Time zone name
    #[arg(long, short = 't', default_value = "UTC")]
    tz: String,

    /// Output file; defaults to terminal
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Account SID; if not given, value of environment variable TWILIO_ACCOUNT_SID
    #[arg(long, short = 'a')]
    account: Option<String>,

    /// Auth token; if not given, value of environment variable TWILIO_AUTH_TOKEN
    #[arg(long, short = 'p')]
    password: Option<String>,

    /// If present, subaccount to use
    #[arg(long, short = 's')]
    subaccount: Option<String>,

    /// Studio API origin
    #[arg(long, env = "TWILIO_STUDIO_BASE_URL", default_value = DEFAULT_BASE_URL, hide = true)]
    api_base: String,
}

fn main() {
    let cli = Cli::parse();

    // stdout carries the report, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.flow.trim().is_empty() {
        return Err(StepsError::MissingArgument.into());
    }

    let credentials = credentials::resolve(
        cli.account.as_deref(),
        cli.password.as_deref(),
        |key| std::env::var(key).ok(),
    )?;
    let window = TimeWindow::parse(&cli.tz, cli.after.as_deref(), cli.before.as_deref())?;
    tracing::debug!(after = ?window.after(), before = ?window.before(), "time window");

    let client =
        StudioClient::with_base_url(credentials, cli.subaccount.as_deref(), &cli.api_base)?;
    let summary = report::run(&client, &cli.flow, &window, || {
        output::open(cli.output.as_deref()).map_err(StepsError::from)
    })?;

    tracing::info!(rows = summary.rows, "done");
    Ok(())
}
