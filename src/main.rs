//! Fatia CLI

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
    time::Duration,
};

use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use fatia::{
    cart::InMemoryCart,
    fixtures::Fixture,
    loader::SizesState,
    logging::{self, LogFormat},
    names::normalize_name,
    quote::Quote,
    session::HalfHalfSession,
};

#[derive(Debug, Parser)]
#[command(name = "fatia", about = "Half-and-half pizza pricing", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "FATIA_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a half-and-half item from a menu fixture and add it to a cart
    Quote(QuoteArgs),
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// Fixtures directory containing `menus/<name>.yml`
    #[arg(long, env = "FATIA_FIXTURES", default_value = "./fixtures")]
    fixtures: PathBuf,

    /// Menu fixture name
    #[arg(long)]
    menu: String,

    /// Category key
    #[arg(long)]
    category: String,

    /// Size name
    #[arg(long)]
    size: String,

    /// Flavor product key; repeat once per slot
    #[arg(long = "flavor", required = true)]
    flavors: Vec<String>,

    /// Option answer as `<group>=<option>`; repeatable
    #[arg(long = "option", value_parser = parse_option_arg)]
    options: Vec<(String, String)>,

    /// Number of items
    #[arg(long, default_value_t = 1)]
    quantity: u32,

    /// Customer notes
    #[arg(long)]
    notes: Option<String>,

    /// Deadline for each menu load, in milliseconds
    #[arg(long, env = "FATIA_LOAD_TIMEOUT_MS", default_value_t = 5000)]
    load_timeout_ms: u64,
}

fn parse_option_arg(s: &str) -> Result<(String, String), String> {
    let (group, option) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <group>=<option>, got: {s}"))?;

    if group.trim().is_empty() || option.trim().is_empty() {
        return Err(format!("expected <group>=<option>, got: {s}"));
    }

    Ok((group.trim().to_string(), option.trim().to_string()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = logging::init(&cli.log_level, cli.log_format) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    match cli.command {
        Commands::Quote(args) => match quote(&args).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                #[expect(clippy::print_stderr, reason = "user-facing CLI error")]
                {
                    eprintln!("{error:#}");
                }

                ExitCode::FAILURE
            }
        },
    }
}

async fn quote(args: &QuoteArgs) -> anyhow::Result<()> {
    let mut fixture = Fixture::with_base_path(&args.fixtures);

    fixture
        .load_menu(&args.menu)
        .with_context(|| format!("failed to load menu {}", args.menu))?;

    let mut session = fixture
        .open_session(&args.category)?
        .with_load_deadline(Duration::from_millis(args.load_timeout_ms));

    match session.load_sizes().await {
        SizesState::Ready { .. } => {}
        SizesState::NotConfigured => bail!("no sizes configured for {}", args.category),
        SizesState::Unavailable(error) => bail!("sizes unavailable: {error}"),
    }

    session.select_size(&args.size)?;
    session.next_step()?;

    for key in &args.flavors {
        session.toggle_flavor(fixture.product(key)?.uuid)?;
    }

    if !args.options.is_empty() {
        if !session.config().has_options_step() {
            bail!("{} does not offer options", args.category);
        }

        session.next_step()?;
        session.load_options().await?;

        for (group, option) in &args.options {
            choose_named(&mut session, group, option)?;
        }
    }

    session.set_quantity(args.quantity)?;

    if let Some(notes) = &args.notes {
        session.set_notes(notes.as_str());
    }

    let cart = InMemoryCart::new();
    let line = session.add_to_cart(&cart).await?;
    let breakdown = session.preview()?;

    info!(line_uuid = %line.uuid, "quoted half-and-half item");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    Quote::for_session(&session, breakdown).write_to(&mut out)?;

    writeln!(out, "{}", line.notes)?;

    Ok(())
}

fn choose_named(session: &mut HalfHalfSession, group: &str, option: &str) -> anyhow::Result<()> {
    let wanted = normalize_name(group);

    let (group_uuid, option_uuid) = {
        let found = session
            .option_groups()
            .find(|candidate| normalize_name(&candidate.name) == wanted)
            .ok_or_else(|| anyhow!("unknown option group: {group}"))?;

        let item = found
            .option_named(option)
            .ok_or_else(|| anyhow!("unknown option {option} in {}", found.name))?;

        (found.uuid, item.uuid)
    };

    session.choose_option(group_uuid, option_uuid)?;

    Ok(())
}
