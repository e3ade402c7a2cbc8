use anyhow::anyhow;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use failcase_core::{Catalogue, Runner};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Provoke each catalogued failure and report how it was handled"
)]
struct FailcaseCli {
    /// Tracing filter directive for diagnostics written to stderr
    #[arg(long, global = true, default_value = "warn", value_name = "DIRECTIVE")]
    log_level: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
enum Command {
    /// Run the scenarios in catalogue order (the default)
    Run {
        /// Only run the named scenario. Repeat for multiple scenarios.
        #[arg(long = "only", value_name = "NAME", action = ArgAction::Append)]
        only: Vec<String>,
        /// Output format
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the catalogued scenarios
    List {
        /// Output format
        #[arg(long, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Run {
            only: Vec::new(),
            format: OutputFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        };
        write!(f, "{value}")
    }
}

fn main() -> anyhow::Result<()> {
    let cli = FailcaseCli::parse();
    init_tracing(&cli.log_level)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command.unwrap_or_default() {
        Command::Run { only, format } => output_run(&only, format, &mut out)?,
        Command::List { format } => output_list(format, &mut out)?,
    }

    Ok(())
}

fn init_tracing(directive: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(directive)
        .map_err(|err| anyhow!("invalid --log-level '{directive}': {err}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn output_run<W: Write>(only: &[String], format: OutputFormat, out: &mut W) -> anyhow::Result<()> {
    let catalogue = if only.is_empty() {
        Catalogue::builtin()
    } else {
        Catalogue::builtin().select(only)?
    };
    let runner = Runner::new(catalogue);
    tracing::debug!(scenarios = runner.catalogue().len(), %format, "starting run");

    match format {
        OutputFormat::Text => runner.emit(out)?,
        OutputFormat::Json => {
            let report = runner.run()?;
            writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        }
        OutputFormat::Yaml => {
            let report = runner.run()?;
            write!(out, "{}", serde_yaml::to_string(&report)?)?;
        }
    }
    Ok(())
}

fn output_list<W: Write>(format: OutputFormat, out: &mut W) -> anyhow::Result<()> {
    let catalogue = Catalogue::builtin();
    match format {
        OutputFormat::Text => writeln!(out, "{}", catalogue.render_table())?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&catalogue)?)?,
        OutputFormat::Yaml => write!(out, "{}", serde_yaml::to_string(&catalogue)?)?,
    }
    Ok(())
}
