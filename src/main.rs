use anyhow::{Context, Result};
use awsrecon::aws::client::format_aws_error;
use awsrecon::aws::profiles;
use awsrecon::config::{Config, OutputFormat};
use awsrecon::{AccountContext, ResourceEnumerator, ResourceKind};
use clap::{Parser, ValueEnum};
use serde_json::{json, Map, Value};
use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Enumerate EC2 and load-balancer resources of an AWS account as JSON
#[derive(Parser, Debug)]
#[command(name = "awsrecon", version, about, long_about = None)]
struct Args {
    /// AWS profile to use (from ~/.aws/config)
    #[arg(short, long)]
    profile: Option<String>,

    /// AWS region to query
    #[arg(short, long)]
    region: Option<String>,

    /// Resource kind to enumerate; repeat for several (default: all)
    #[arg(short = 't', long = "resource", value_enum)]
    resources: Vec<ResourceKind>,

    /// Output document format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Indent JSON output
    #[arg(long)]
    pretty: bool,

    /// Remember the effective profile and region as defaults
    #[arg(long)]
    save: bool,

    /// List locally configured profiles and exit
    #[arg(long)]
    list_profiles: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        },
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("awsrecon {} started with log level: {:?}", awsrecon::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("awsrecon").join("awsrecon.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".awsrecon").join("awsrecon.log");
    }
    PathBuf::from("awsrecon.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("Error: {}", format_aws_error(&err));
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<()> {
    if args.list_profiles {
        for profile in profiles::list_profiles() {
            println!("{}", profile);
        }
        return Ok(());
    }

    // Profile and region: CLI > config > environment / shared config
    let mut config = Config::load();
    let profile = args
        .profile
        .clone()
        .unwrap_or_else(|| config.effective_profile());
    let region = args
        .region
        .clone()
        .unwrap_or_else(|| config.effective_region(&profile));
    let output = args.output.unwrap_or_else(|| config.effective_output());

    tracing::info!("Using profile: {}, region: {}", profile, region);

    let kinds = selected_kinds(&args.resources);

    let mut enumerator = connect_then(ResourceEnumerator::connect(&profile, &region), |context| {
        if args.save {
            config.set_defaults(&context.profile, &context.region)?;
        }
        Ok(())
    })
    .await?;

    let failures = enumerator.enumerate_all(&kinds).await;

    for (kind, err) in &failures {
        eprintln!("Error: {} enumeration failed: {}", kind, format_aws_error(err));
    }

    if let Some(document) = build_document(&enumerator, &kinds)? {
        println!("{}", render(&document, output, args.pretty)?);
    }

    if !failures.is_empty() {
        return Err(anyhow::anyhow!(
            "{} of {} resource kind(s) failed",
            failures.len(),
            kinds.len()
        ));
    }

    Ok(())
}

/// Await the connection, then run `on_connected`; a failed connection
/// never reaches it, so a mistyped profile is not saved as the default
async fn connect_then<S, F>(
    connecting: F,
    on_connected: impl FnOnce(&AccountContext) -> Result<()>,
) -> Result<ResourceEnumerator<S>>
where
    F: Future<Output = Result<ResourceEnumerator<S>>>,
{
    let enumerator = connecting.await?;
    on_connected(enumerator.context())?;
    Ok(enumerator)
}

/// Requested kinds in canonical order; all kinds when none were given
fn selected_kinds(requested: &[ResourceKind]) -> Vec<ResourceKind> {
    if requested.is_empty() {
        return ResourceKind::ALL.to_vec();
    }
    let mut kinds = requested.to_vec();
    kinds.sort();
    kinds.dedup();
    kinds
}

/// One kind prints its collection as is; several are wrapped in a report
fn build_document(
    enumerator: &ResourceEnumerator,
    kinds: &[ResourceKind],
) -> Result<Option<Value>> {
    if let [kind] = kinds {
        return enumerator
            .json(*kind)
            .map(|text| serde_json::from_str(text).context("Stored collection is not valid JSON"))
            .transpose();
    }

    let mut resources = Map::new();
    for kind in kinds {
        if let Some(collection) = enumerator.collection(*kind) {
            resources.insert(
                kind.resource_key().to_string(),
                serde_json::to_value(collection)?,
            );
        }
    }

    let context = enumerator.context();
    Ok(Some(json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "profile": context.profile,
        "region": context.region,
        "resources": resources,
    })))
}

fn render(document: &Value, output: OutputFormat, pretty: bool) -> Result<String> {
    match output {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(document)?),
        OutputFormat::Json => Ok(serde_json::to_string(document)?),
        OutputFormat::Yaml => serde_yaml::to_string(document).context("Failed to render YAML"),
    }
}
