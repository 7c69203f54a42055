// crates/formwork-cli/src/main.rs
// ============================================================================
// Module: Formwork CLI Entry Point
// Description: Command dispatcher for offline form engine workflows.
// Purpose: Project, validate, switch, and commit instances; check queries.
// Dependencies: clap, formwork-core, formwork-config, rule-expr, serde_json.
// ============================================================================

//! ## Overview
//! The Formwork CLI runs the form engine over JSON files: descriptor
//! catalogs, sparse instances, projected views, and time-series queries.
//! Every input file is read with a hard size limit. Results are printed to
//! stdout as JSON; failures go to stderr with a non-zero exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use formwork_config::CONFIG_ENV_VAR;
use formwork_config::DEFAULT_CONFIG_NAME;
use formwork_config::FormworkConfig;
use formwork_config::config_toml_example;
use formwork_core::DescriptorCatalog;
use formwork_core::EditSession;
use formwork_core::Instance;
use formwork_core::Interval;
use formwork_core::IntervalUnit;
use formwork_core::MAX_CATALOG_FILE_BYTES;
use formwork_core::QueryIssue;
use formwork_core::QueryValidator;
use formwork_core::TimeSeriesQuery;
use formwork_core::ViewProperty;
use formwork_core::commit;
use formwork_core::format_interval;
use formwork_core::parse_interval;
use formwork_core::project;
use formwork_core::read_catalog_file;
use formwork_core::switch_variant;
use formwork_core::to_long_form;
use rule_expr::Expression;
use rule_expr::ExprValue;
use rule_expr::NoBindings;
use rule_expr::SingleBinding;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of an instance JSON input.
const MAX_INSTANCE_BYTES: usize = 1024 * 1024;
/// Maximum size of a projected view list input.
const MAX_VIEWS_BYTES: usize = 4 * 1024 * 1024;
/// Maximum size of a query JSON input.
const MAX_QUERY_BYTES: usize = 4 * 1024 * 1024;
/// Maximum size of an inline JSON value argument.
const MAX_VALUE_ARG_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "formwork", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Project an instance against a catalog and print its views.
    Project(InstanceArgs),
    /// Validate an instance and print field errors.
    Validate(ValidateCommand),
    /// Move an instance to another variant.
    Switch(SwitchCommand),
    /// Commit a projected view list back into an instance.
    Commit(CommitCommand),
    /// Interval utilities.
    Interval {
        /// Selected interval subcommand.
        #[command(subcommand)]
        command: IntervalCommand,
    },
    /// Rule expression utilities.
    Expr {
        /// Selected expression subcommand.
        #[command(subcommand)]
        command: ExprCommand,
    },
    /// Time-series query utilities.
    Query {
        /// Selected query subcommand.
        #[command(subcommand)]
        command: QueryCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Catalog and instance inputs.
#[derive(Args, Debug)]
struct InstanceArgs {
    /// Descriptor catalog JSON file.
    #[arg(long, value_name = "PATH")]
    catalog: PathBuf,
    /// Instance JSON file.
    #[arg(long, value_name = "PATH")]
    instance: PathBuf,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Catalog and instance inputs.
    #[command(flatten)]
    input: InstanceArgs,
    /// Optional config file path (defaults to formwork.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `switch`.
#[derive(Args, Debug)]
struct SwitchCommand {
    /// Catalog and instance inputs.
    #[command(flatten)]
    input: InstanceArgs,
    /// Target variant name.
    #[arg(long, value_name = "NAME")]
    variant: String,
}

/// Arguments for `commit`.
#[derive(Args, Debug)]
struct CommitCommand {
    /// Variant name written to the instance.
    #[arg(long, value_name = "NAME")]
    name: String,
    /// Projected view list JSON file.
    #[arg(long, value_name = "PATH")]
    views: PathBuf,
}

/// Interval subcommands.
#[derive(Subcommand, Debug)]
enum IntervalCommand {
    /// Parse short-form text such as `5m` or `1.5h`.
    Parse {
        /// Interval text.
        text: String,
        /// Print the long form (`5 minutes`) instead of JSON.
        #[arg(long)]
        long: bool,
    },
    /// Format a value and unit in short form.
    Format {
        /// Whole number of units.
        #[arg(long)]
        value: u64,
        /// Unit code (`ms`, `s`, `m`, `h`, `d`, `w`, `M`, `y`) or long name.
        #[arg(long)]
        unit: String,
    },
}

/// Rule expression subcommands.
#[derive(Subcommand, Debug)]
enum ExprCommand {
    /// Evaluate an expression, optionally binding `value`.
    Eval {
        /// Expression source.
        expression: String,
        /// JSON value bound to `value`.
        #[arg(long, value_name = "JSON")]
        value: Option<String>,
    },
}

/// Query subcommands.
#[derive(Subcommand, Debug)]
enum QueryCommand {
    /// Check a query before submission.
    Check(QueryCheckCommand),
}

/// Arguments for `query check`.
#[derive(Args, Debug)]
struct QueryCheckCommand {
    /// Query JSON file.
    #[arg(long, value_name = "PATH")]
    query: PathBuf,
    /// Aggregator catalog (overrides `catalogs.aggregators`).
    #[arg(long, value_name = "PATH")]
    aggregators: Option<PathBuf>,
    /// Group-by catalog (overrides `catalogs.group_by`).
    #[arg(long = "group-by", value_name = "PATH")]
    group_by: Option<PathBuf>,
    /// Optional config file path (defaults to formwork.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Formwork configuration file.
    Validate {
        /// Optional config file path (defaults to formwork.toml or env override).
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// Print a canonical example configuration.
    Example,
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Field error reported by `validate`.
#[derive(Debug, Serialize)]
struct FieldError {
    /// Effective key of the field.
    field: String,
    /// Validation message.
    message: String,
}

/// Result printed by `validate`.
#[derive(Debug, Serialize)]
struct ValidateReport {
    /// True when no active field has an error.
    valid: bool,
    /// Errors in view order.
    errors: Vec<FieldError>,
}

/// Result printed by `query check`.
#[derive(Debug, Serialize)]
struct QueryReport {
    /// True when no issue was found.
    valid: bool,
    /// Issues in query order.
    issues: Vec<QueryIssue>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Project(command) => command_project(&command),
        Commands::Validate(command) => command_validate(&command),
        Commands::Switch(command) => command_switch(&command),
        Commands::Commit(command) => command_commit(&command),
        Commands::Interval {
            command,
        } => command_interval(command),
        Commands::Expr {
            command,
        } => command_expr(command),
        Commands::Query {
            command,
        } => match command {
            QueryCommand::Check(command) => command_query_check(&command),
        },
        Commands::Config {
            command,
        } => command_config(command),
    }
}

// ============================================================================
// SECTION: Instance Commands
// ============================================================================

/// Executes the `project` command.
fn command_project(command: &InstanceArgs) -> CliResult<ExitCode> {
    let (catalog, instance) = read_instance_inputs(command)?;
    write_json(&project(Some(&catalog), &instance))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `validate` command.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let audit = config.audit.build_sink().map_err(|err| CliError::new(err.to_string()))?;
    let (catalog, instance) = read_instance_inputs(&command.input)?;
    let session =
        EditSession::open(Some(&catalog), &instance, config.validation.options(), audit.as_ref());
    let errors: Vec<FieldError> = session
        .errors()
        .into_iter()
        .map(|(field, message)| FieldError {
            field,
            message,
        })
        .collect();
    let report = ValidateReport {
        valid: errors.is_empty(),
        errors,
    };
    write_json(&report)?;
    Ok(if report.valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Executes the `switch` command.
fn command_switch(command: &SwitchCommand) -> CliResult<ExitCode> {
    let (catalog, instance) = read_instance_inputs(&command.input)?;
    if catalog.find(&command.variant).is_none() {
        return Err(CliError::new(format!(
            "variant `{}` is not declared by the catalog",
            command.variant
        )));
    }
    write_json(&switch_variant(Some(&catalog), &instance, &command.variant))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `commit` command.
fn command_commit(command: &CommitCommand) -> CliResult<ExitCode> {
    let views: Vec<ViewProperty> = read_json_file(&command.views, "views", MAX_VIEWS_BYTES)?;
    write_json(&commit(&command.name, &views))?;
    Ok(ExitCode::SUCCESS)
}

/// Reads the catalog and instance named by `args`.
fn read_instance_inputs(args: &InstanceArgs) -> CliResult<(DescriptorCatalog, Instance)> {
    let catalog = read_catalog(&args.catalog)?;
    let instance: Instance = read_json_file(&args.instance, "instance", MAX_INSTANCE_BYTES)?;
    Ok((catalog, instance))
}

// ============================================================================
// SECTION: Interval and Expression Commands
// ============================================================================

/// Dispatches interval subcommands.
fn command_interval(command: IntervalCommand) -> CliResult<ExitCode> {
    match command {
        IntervalCommand::Parse {
            text,
            long,
        } => {
            let interval = parse_interval(&text).map_err(|err| CliError::new(err.to_string()))?;
            if long {
                write_line(&to_long_form(&interval))?;
            } else {
                write_json(&interval)?;
            }
        }
        IntervalCommand::Format {
            value,
            unit,
        } => {
            let unit = unit.parse::<IntervalUnit>().map_err(|err| CliError::new(err.to_string()))?;
            write_line(&format_interval(&Interval::new(value, unit)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Dispatches expression subcommands.
fn command_expr(command: ExprCommand) -> CliResult<ExitCode> {
    match command {
        ExprCommand::Eval {
            expression,
            value,
        } => {
            let result = evaluate_expression(&expression, value.as_deref())?;
            write_json(&result.to_json())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Parses and evaluates an expression with an optional JSON `value`.
fn evaluate_expression(source: &str, value: Option<&str>) -> CliResult<ExprValue> {
    let expression = Expression::parse(source).map_err(|err| CliError::new(err.to_string()))?;
    let result = match value {
        Some(text) => {
            if text.len() > MAX_VALUE_ARG_BYTES {
                return Err(CliError::new(format!(
                    "--value exceeds size limit of {MAX_VALUE_ARG_BYTES} bytes"
                )));
            }
            let json: Value = serde_json::from_str(text)
                .map_err(|err| CliError::new(format!("--value is not valid json: {err}")))?;
            expression.evaluate(&SingleBinding::value(ExprValue::from(json)))
        }
        None => expression.evaluate(&NoBindings),
    };
    result.map_err(|err| CliError::new(err.to_string()))
}

// ============================================================================
// SECTION: Query Commands
// ============================================================================

/// Executes the `query check` command.
fn command_query_check(command: &QueryCheckCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let bytes = read_bytes(&command.query, "query", MAX_QUERY_BYTES)?;
    let query = TimeSeriesQuery::from_json_slice(&bytes)
        .map_err(|err| CliError::new(format!("{}: {err}", command.query.display())))?;

    let aggregators = command
        .aggregators
        .clone()
        .or_else(|| config.catalogs.aggregators_path())
        .map(|path| read_catalog(&path))
        .transpose()?;
    let group_by = command
        .group_by
        .clone()
        .or_else(|| config.catalogs.group_by_path())
        .map(|path| read_catalog(&path))
        .transpose()?;

    let mut validator = QueryValidator::new(config.validation.options());
    if let Some(catalog) = &aggregators {
        validator = validator.with_aggregators(catalog);
    }
    if let Some(catalog) = &group_by {
        validator = validator.with_group_by(catalog);
    }
    let issues = validator.check(&query);
    let report = QueryReport {
        valid: issues.is_empty(),
        issues,
    };
    write_json(&report)?;
    Ok(if report.valid { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate {
            config,
        } => {
            FormworkConfig::load(config.as_deref())
                .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
            write_line("config is valid")?;
        }
        ConfigCommand::Example => {
            write_stdout_bytes(config_toml_example().as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration, falling back to defaults when none is present.
///
/// An explicit path, the environment override, or an existing default file
/// must load cleanly.
fn load_config(path: Option<&Path>) -> CliResult<FormworkConfig> {
    let implicit = path.is_none()
        && std::env::var_os(CONFIG_ENV_VAR).is_none()
        && !Path::new(DEFAULT_CONFIG_NAME).exists();
    if implicit {
        return Ok(FormworkConfig::default());
    }
    FormworkConfig::load(path).map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads an input file, mapping failures to CLI errors.
fn read_bytes(path: &Path, kind: &str, max_bytes: usize) -> CliResult<Vec<u8>> {
    read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(format!("failed to read {kind} {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "{kind} {} is {size} bytes, exceeding the limit of {limit} bytes",
            path.display()
        )),
    })
}

/// Reads and decodes a JSON input file.
fn read_json_file<T: DeserializeOwned>(path: &Path, kind: &str, max_bytes: usize) -> CliResult<T> {
    let bytes = read_bytes(path, kind, max_bytes)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(format!("invalid {kind} json in {}: {err}", path.display())))
}

/// Reads and checks a descriptor catalog file.
fn read_catalog(path: &Path) -> CliResult<DescriptorCatalog> {
    let bytes = read_catalog_file(path, MAX_CATALOG_FILE_BYTES)
        .map_err(|err| CliError::new(err.to_string()))?;
    DescriptorCatalog::from_json_slice(&bytes)
        .map_err(|err| CliError::new(format!("{}: {err}", path.display())))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a line to stdout, mapping failures to CLI errors.
fn write_line(message: &str) -> CliResult<()> {
    write_stdout_line(message).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes pretty-printed JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
    write_line(&text)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
