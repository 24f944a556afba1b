// 🖥️ Octal Converter CLI
// Thin front end: load tables, convert, report, deliver

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use octal_convert::{
    convert_documentation, AddressRange, ConversionSession, ConverterConfig, DeclaredType,
    DocumentationTable, IntPolicy, Joiner, TableKind,
};

/// Convert octal PLC address tables into the target import CSV.
#[derive(Parser, Debug)]
#[command(name = "octal-convert")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON config file (all fields optional).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// INT mapping policy, overrides the config file (plain | offset).
    #[arg(long, global = true)]
    int_policy: Option<IntPolicy>,

    /// Print the CSV to stdout instead of writing the output file.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Also write the per-row diagnostics as JSON to this path.
    #[arg(long, global = true)]
    report: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Join documentation with a variables table (ADDRESS, TYPE).
    Variables {
        /// Documentation CSV (no header; address in column 1, name in column 4).
        #[arg(long)]
        docs: PathBuf,
        /// Variables CSV with upper-case ADDRESS and TYPE headers.
        #[arg(long)]
        vars: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Join documentation with an alarms table (ADDRESS); every alarm is boolean.
    Alarms {
        #[arg(long)]
        docs: PathBuf,
        #[arg(long)]
        alarms: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Convert documentation rows directly as one type, optionally within a range.
    Batch {
        #[arg(short, long)]
        input: PathBuf,
        /// BOOL, INT or FLOAT.
        #[arg(short = 't', long = "type")]
        declared_type: DeclaredType,
        /// First address to convert (e.g. V13200).
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// Address that stops conversion; not itself converted.
        #[arg(long, requires = "start")]
        end: Option<String>,
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_logging() {
    let json_logging = std::env::var("OCTAL_CONVERT_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("octal_convert=info"));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(args: &Args) -> Result<ConverterConfig> {
    let mut config = match &args.config {
        Some(path) => ConverterConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => ConverterConfig::default(),
    };
    if let Some(policy) = args.int_policy {
        config = config.with_int_policy(policy);
    }
    Ok(config)
}

fn load_documentation(path: &Path) -> Result<DocumentationTable> {
    DocumentationTable::from_path(path)
        .with_context(|| format!("Failed to read documentation CSV: {}", path.display()))
}

/// Print diagnostics, then write the file unless addresses are missing
fn deliver(session: &ConversionSession, args: &Args, output: &Path) -> Result<()> {
    let Some(last) = session.last() else {
        anyhow::bail!("nothing was converted");
    };

    // malformed documentation rows were already logged while loading
    for line in last.diagnostics.report_lines() {
        eprintln!("{}", line);
    }

    if let Some(report) = &args.report {
        fs::write(report, last.diagnostics.to_json()?)
            .with_context(|| format!("Failed to write report: {}", report.display()))?;
        eprintln!("📝 Diagnostics written to: {}", report.display());
    }

    if !last.is_deliverable() {
        eprintln!("⚠️  Please fix missing addresses before exporting.");
    }
    let csv = session.deliverable_csv()?;

    if args.dry_run {
        print!("{}", csv);
        return Ok(());
    }

    fs::write(output, csv)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    eprintln!("✅ Output written to: {} (sha256 {})", output.display(), last.fingerprint());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = load_config(&args)?;
    let mut session = ConversionSession::new();

    match &args.command {
        Command::Variables { docs, vars, output } => {
            let documentation = load_documentation(docs)?;
            let records = octal_convert::read_variables_from_path(vars, TableKind::Variables)
                .with_context(|| format!("Failed to read variables CSV: {}", vars.display()))?;
            let result = Joiner::new(&documentation, &config).convert_variables(&records);
            session.record(&result)?;
            deliver(&session, &args, output)
        }
        Command::Alarms { docs, alarms, output } => {
            let documentation = load_documentation(docs)?;
            let records = octal_convert::read_variables_from_path(alarms, TableKind::Alarms)
                .with_context(|| format!("Failed to read alarms CSV: {}", alarms.display()))?;
            let result = Joiner::new(&documentation, &config).convert_alarms(&records);
            session.record(&result)?;
            deliver(&session, &args, output)
        }
        Command::Batch {
            input,
            declared_type,
            start,
            end,
            output,
        } => {
            let documentation = load_documentation(input)?;
            let range = match (start, end) {
                (Some(s), Some(e)) => Some(AddressRange::new(
                    s.trim().to_uppercase(),
                    e.trim().to_uppercase(),
                )),
                _ => None,
            };
            let result = convert_documentation(&documentation, *declared_type, range.as_ref(), &config);
            session.record(&result)?;
            deliver(&session, &args, output)
        }
    }
}
