//! Purpose: `stocklet` CLI entry point and v0 command dispatch.
//! Role: Binary crate root; parses arguments and hands commands to the dispatcher.
//! Invariants: Stdout carries command output only, as stable JSON or table shapes.
//! Invariants: Errors and notices go to stderr, as JSON when stderr is not a TTY.
//! Invariants: Exit codes come from `api::to_exit_code`.
//! Invariants: All catalog mutations go through `api::Catalog` (store lock safety).
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal, Read};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::{
    Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use std::time::{SystemTime, UNIX_EPOCH};

mod catalog_paths;
mod color_json;
mod command_dispatch;
mod serve;

use catalog_paths::default_catalog_dir;
use color_json::colorize_json;
use stocklet::api::{Catalog, Error, ErrorKind, Product, RemoteCatalog, extract, to_exit_code};
use stocklet::notice::{Notice, notice_json};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return handle_parse_error(err),
    };

    serve::init_tracing();

    let catalog_dir = cli.dir.unwrap_or_else(default_catalog_dir);
    let color_mode = cli.color;

    let result = command_dispatch::dispatch_command(cli.command, catalog_dir, color_mode);

    result
        .map_err(add_corrupt_hint)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

fn handle_parse_error(err: clap::Error) -> Result<RunOutcome, (Error, ColorMode)> {
    let kind = err.kind();
    let is_help_like = matches!(
        kind,
        ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    );
    if !is_help_like {
        let usage = Error::new(ErrorKind::Usage)
            .with_message(clap_error_summary(&err))
            .with_hint(clap_error_hint(&err));
        return Err((usage, ColorMode::Auto));
    }

    err.print().map_err(|io_err| {
        (
            Error::new(ErrorKind::Io)
                .with_message("failed to render help")
                .with_source(io_err),
            ColorMode::Auto,
        )
    })?;
    // Help shown because arguments were missing still exits nonzero.
    let code = match kind {
        ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 2,
        _ => 0,
    };
    Ok(RunOutcome::with_code(code))
}

#[derive(Debug, Parser)]
#[command(
    name = "stocklet",
    version,
    about = "Tiny product catalog fed by model output",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Products live in a JSON Lines store on disk. Output is JSON.

Mental model:
  - `extract` pulls a json value out of model output (code fences stripped)
  - `add` creates a product (from a name, or from model output json)
  - `list` shows what the catalog holds
"#,
    after_help = r#"EXAMPLES
  $ stocklet add "blue widget"
  $ stocklet list
  $ model-cli reply | stocklet extract | jq '.name'
  $ stocklet serve --bind 127.0.0.1:9900

LEARN MORE
  Common catalog operations:
    stocklet add <name>
    stocklet add --from-model <text>
    stocklet list
    stocklet extract <text>

  $ stocklet <command> --help"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        help = "Catalog directory (default: ~/.stocklet)",
        value_hint = ValueHint::DirPath
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Color stderr diagnostics and pretty JSON: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Extract a json value from model output",
        long_about = r#"Extract a json value from model output and print it.

Strips one leading ``` code fence (optionally tagged json or javascript) and a
trailing ``` fence, then parses the remainder as JSON. Text without a leading
fence is parsed as-is."#,
        after_help = r#"EXAMPLES
  $ stocklet extract '{"ok": true}'
  $ model-cli reply | stocklet extract
  $ stocklet extract --file reply.txt | jq '.name'"#
    )]
    Extract {
        #[arg(help = "Model output text (reads stdin when omitted)")]
        text: Option<String>,
        #[arg(
            short = 'f',
            long = "file",
            help = "Input file path (use - for stdin)",
            conflicts_with = "text",
            value_hint = ValueHint::FilePath
        )]
        file: Option<String>,
    },
    #[command(
        arg_required_else_help = true,
        about = "Add a product to the catalog",
        long_about = r#"Add a product to the catalog and print the created record.

Takes the product name directly, or pulls it from model output json with
--from-model. Extra fields in model output are ignored with a stderr notice."#,
        after_help = r#"EXAMPLES
  $ stocklet add "blue widget"
  $ stocklet add --from-model '```json {"name": "gadget", "price": 9}```'
  $ stocklet add "remote widget" --url http://127.0.0.1:9900

NOTES
  - Default location: ~/.stocklet (override with --dir)
  - --url targets a running `stocklet serve` instead of the local store"#
    )]
    Add {
        #[arg(help = "Product name")]
        name: Option<String>,
        #[arg(
            long = "from-model",
            value_name = "TEXT",
            help = "Take the name from model output json (use - for stdin)",
            conflicts_with = "name"
        )]
        from_model: Option<String>,
        #[arg(
            long,
            value_name = "URL",
            help = "Create through a running server instead of the local catalog"
        )]
        url: Option<String>,
    },
    #[command(
        about = "List products in the catalog",
        after_help = r#"EXAMPLES
  $ stocklet list
  $ stocklet list --json | jq '.products[].id'"#
    )]
    List {
        #[arg(long, help = "Emit a json envelope instead of a table")]
        json: bool,
    },
    #[command(
        about = "Serve the catalog over HTTP (loopback default in v0)",
        long_about = r#"Serve the catalog over HTTP (loopback default in v0).

Exposes POST /v0/products and GET /healthz. Responses carry a
`stocklet-version: 0` header."#,
        after_help = r#"EXAMPLES
  $ stocklet serve
  $ stocklet serve --bind 127.0.0.1:9901
  $ stocklet serve --cors-origin https://app.example

NOTES
  - Binds 127.0.0.1 by default; --allow-non-loopback opts into wider exposure
  - Repeat --cors-origin to let browser clients call the API from listed origins
  - Safety limits: --max-body-bytes"#
    )]
    Serve {
        #[command(flatten)]
        run: ServeRunArgs,
    },
    #[command(about = "Print version information")]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completion scripts",
        after_help = r#"EXAMPLES
  $ stocklet completion bash > /etc/bash_completion.d/stocklet
  $ stocklet completion zsh > "${fpath[1]}/_stocklet""#
    )]
    Completion {
        #[arg(value_enum, help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
struct ServeRunArgs {
    #[arg(
        long,
        default_value = "127.0.0.1:9900",
        help = "Bind address (host:port)"
    )]
    bind: String,
    #[arg(
        long = "allow-non-loopback",
        help = "Allow binding to non-loopback addresses"
    )]
    allow_non_loopback: bool,
    #[arg(
        long = "cors-origin",
        value_name = "ORIGIN",
        help = "Repeatable allowed CORS origin for browser clients"
    )]
    cors_origin: Vec<String>,
    #[arg(
        long = "max-body-bytes",
        default_value_t = 1_048_576,
        help = "Maximum request body size in bytes"
    )]
    max_body_bytes: u64,
}

fn resolve_extract_input(text: Option<String>, file: Option<String>) -> Result<String, Error> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return read_input(&path);
    }
    if io::stdin().is_terminal() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("missing input text")
            .with_hint("Pass TEXT, use --file, or pipe model output to stdin."));
    }
    read_input("-")
}

fn read_input(path: &str) -> Result<String, Error> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read stdin")
                .with_source(err)
        })?;
        return Ok(buffer);
    }
    std::fs::read_to_string(path).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read input file")
            .with_path(path)
            .with_source(err)
    })
}

fn name_from_model_output(text: &str, color_mode: ColorMode) -> Result<String, Error> {
    let Some(value) = extract(Some(text)) else {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("model output did not contain a json value")
            .with_hint(
                "Pass text holding a json object like {\"name\": \"...\"} (``` fences are fine).",
            ));
    };
    let Some(object) = value.as_object() else {
        return Err(
            Error::new(ErrorKind::Usage).with_message("model output must decode to a json object")
        );
    };
    let name = match object.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(_) => {
            return Err(
                Error::new(ErrorKind::Usage).with_message("model output \"name\" must be a string")
            );
        }
        None => {
            return Err(
                Error::new(ErrorKind::Usage).with_message("model output has no \"name\" field")
            );
        }
    };
    let ignored: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|key| *key != "name")
        .collect();
    if !ignored.is_empty() {
        let time = notice_time_now().unwrap_or_else(|| "unknown".to_string());
        let details = Map::from_iter([("ignored".to_string(), json!(ignored))]);
        emit_notice(
            &Notice {
                kind: "ignored_fields".to_string(),
                time,
                cmd: "add".to_string(),
                message: format!(
                    "Ignored extra fields from model output: {}.",
                    ignored.join(", ")
                ),
                details,
            },
            color_mode,
        );
    }
    Ok(name)
}

fn product_json(product: &Product) -> Value {
    json!({
        "id": product.id,
        "name": product.name,
        "status": product.status,
        "created": product.created,
    })
}

fn serve_config_from_run_args(
    run: ServeRunArgs,
    catalog_dir: &Path,
) -> Result<serve::ServeConfig, Error> {
    let bind: SocketAddr = run.bind.parse().map_err(|_| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid bind address: {}", run.bind))
            .with_hint("Use a host:port value like 127.0.0.1:9900.")
    })?;
    Ok(serve::ServeConfig {
        bind,
        catalog_dir: catalog_dir.to_path_buf(),
        allow_non_loopback: run.allow_non_loopback,
        cors_origins: run.cors_origin,
        max_body_bytes: run.max_body_bytes,
    })
}

fn emit_products_table(products: &[Product]) {
    let rows = products
        .iter()
        .map(|product| {
            vec![
                product.name.clone(),
                product.status.clone(),
                format_relative_from_timestamp(&product.created),
                product.id.clone(),
            ]
        })
        .collect::<Vec<_>>();
    println!("{}", render_table(&["NAME", "STATUS", "AGE", "ID"], &rows));
}

fn format_relative_time(age_ms: Option<u64>) -> String {
    let Some(age_ms) = age_ms else {
        return "-".to_string();
    };
    // Ages under a second display as the smallest nonzero bucket.
    let seconds = (age_ms / 1000).max(1);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    if days >= 7 {
        format!("{}w ago", days / 7)
    } else if days >= 1 {
        format!("{days}d ago")
    } else if hours >= 1 {
        format!("{hours}h ago")
    } else if minutes >= 1 {
        format!("{minutes}m ago")
    } else {
        format!("{seconds}s ago")
    }
}

fn format_relative_from_timestamp(value: &str) -> String {
    format_relative_time(age_ms_since(value))
}

fn age_ms_since(value: &str) -> Option<u64> {
    let parsed =
        time::OffsetDateTime::parse(value, &time::format_description::well_known::Rfc3339).ok()?;
    let now = time::OffsetDateTime::from_unix_timestamp_nanos(now_ns().ok()? as i128).ok()?;
    let delta_ns = now
        .unix_timestamp_nanos()
        .saturating_sub(parsed.unix_timestamp_nanos())
        .max(0);
    Some((delta_ns / 1_000_000) as u64)
}

fn now_ns() -> Result<u64, Error> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since_epoch| since_epoch.as_nanos() as u64)
        .map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("system clock is before the unix epoch")
                .with_source(err)
        })
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }
    // Widths track the widest cell per column, in chars, headers included.
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    let cleaned_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            widths
                .iter_mut()
                .enumerate()
                .map(|(idx, width)| {
                    let cell = sanitize_table_cell(row.get(idx).map_or("", String::as_str));
                    *width = (*width).max(cell.chars().count());
                    cell
                })
                .collect()
        })
        .collect();

    let header_row: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut lines = vec![format_table_line(&header_row, &widths)];
    lines.extend(cleaned_rows.iter().map(|row| format_table_line(row, &widths)));
    lines.join("\n")
}

fn sanitize_table_cell(value: &str) -> String {
    value.replace('\n', "\\n").replace('\r', "\\r")
}

fn format_table_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    let last = widths.len().saturating_sub(1);
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(idx).map_or("", String::as_str);
        line.push_str(cell);
        // The last column is left ragged so lines carry no trailing spaces.
        if idx < last {
            let pad = width.saturating_sub(cell.chars().count());
            line.push_str(&" ".repeat(pad));
        }
    }
    line
}

fn emit_json(value: serde_json::Value, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let rendered = if use_color {
        colorize_json(&value, true)
    } else if is_tty {
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| encode_failure())
    } else {
        serde_json::to_string(&value).unwrap_or_else(|_| encode_failure())
    };
    println!("{rendered}");
}

fn encode_failure() -> String {
    "{\"error\":\"json encode failed\"}".to_string()
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
    } else {
        let line = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
            "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
        });
        eprintln!("{line}");
    }
}

fn notice_time_now() -> Option<String> {
    use time::format_description::well_known::Rfc3339;
    let since_epoch = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    time::OffsetDateTime::from_unix_timestamp_nanos(since_epoch.as_nanos() as i128)
        .ok()?
        .format(&Rfc3339)
        .ok()
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {}", notice.message);
    } else {
        let line = serde_json::to_string(&notice_json(notice)).unwrap_or_else(|_| {
            "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
        });
        eprintln!("{line}");
    }
}

fn error_message(err: &Error) -> String {
    match err.message() {
        Some(message) => message.to_string(),
        None => kind_summary(err.kind()).to_string(),
    }
}

fn kind_summary(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Internal => "internal error",
        ErrorKind::Usage => "usage error",
        ErrorKind::NotFound => "not found",
        ErrorKind::Busy => "resource is busy",
        ErrorKind::Permission => "permission denied",
        ErrorKind::Corrupt => "corrupt data",
        ErrorKind::Io => "i/o error",
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut next = err.source();
    while let Some(cause) = next {
        causes.push(cause.to_string());
        next = cause.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut body = Map::new();
    body.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    body.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        body.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        body.insert("path".to_string(), json!(path.display().to_string()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        body.insert("causes".to_string(), json!(causes));
    }
    json!({ "error": body })
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut out = Vec::new();
    let label = colorize_label("error:", use_color, AnsiColor::Red);
    out.push(format!("{label} {}", error_message(err)));

    if let Some(hint) = err.hint() {
        let label = colorize_label("hint:", use_color, AnsiColor::Yellow);
        out.push(format!("{label} {hint}"));
    }
    if let Some(path) = err.path() {
        let label = colorize_label("path:", use_color, AnsiColor::Yellow);
        out.push(format!("{label} {}", path.display()));
    }
    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        let label = colorize_label("caused by:", use_color, AnsiColor::Yellow);
        out.push(format!("{label} {cause}"));
    }

    out.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().map(str::trim).find(|line| !line.is_empty());
    match first {
        Some(line) => line.strip_prefix("error:").unwrap_or(line).trim().to_string(),
        None => "invalid arguments".to_string(),
    }
}

// Point the hint at the subcommand clap was parsing, read off its usage line.
fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let Some(usage) = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
    else {
        return "Try `stocklet --help`.".to_string();
    };

    let mut subcommand = Vec::new();
    for token in usage
        .split_whitespace()
        .skip_while(|token| *token != "stocklet")
        .skip(1)
    {
        if token.starts_with(&['-', '<', '['][..]) {
            break;
        }
        subcommand.push(token);
    }

    if subcommand.is_empty() {
        "Try `stocklet --help`.".to_string()
    } else {
        format!("Try `stocklet {} --help`.", subcommand.join(" "))
    }
}

fn emit_version_output(color_mode: ColorMode) {
    if io::stdout().is_terminal() {
        println!("stocklet {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            json!({
                "name": "stocklet",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            color_mode,
        );
    }
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Permission => err.with_hint(
            "Permission denied. Check directory permissions or point --dir at a writable location.",
        ),
        ErrorKind::Busy => {
            err.with_hint("Catalog is busy (another writer holds the lock). Retry with backoff.")
        }
        ErrorKind::Io => err.with_hint("I/O failure. Check the path, free space, and filesystem."),
        _ => err,
    }
}

fn add_corrupt_hint(err: Error) -> Error {
    if err.kind() == ErrorKind::Corrupt && err.hint().is_none() {
        return err
            .with_hint("Catalog store appears corrupt. Inspect or remove products.jsonl and retry.");
    }
    err
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() == ErrorKind::Internal && err.hint().is_none() {
        return err.with_hint(
            "Unexpected internal failure. Re-run with RUST_BACKTRACE=1 and report the command if it persists.",
        );
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_table_pads_and_aligns_columns() {
        let headers = ["NAME", "STATUS", "AGE", "ID"];
        let rows = vec![
            vec![
                "widget".to_string(),
                "active".to_string(),
                "2m ago".to_string(),
                "ab12".to_string(),
            ],
            vec![
                "long product name".to_string(),
                "active".to_string(),
                "1s ago".to_string(),
                "cd34".to_string(),
            ],
        ];
        let table = render_table(&headers, &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3, "header plus one line per row");
        assert!(lines[0].starts_with("NAME "));
        let status_col = lines[0].find("STATUS").unwrap();
        assert_eq!(lines[1].find("active").unwrap(), status_col);
        assert_eq!(lines[2].find("active").unwrap(), status_col);
        let id_col = lines[0].find("ID").unwrap();
        assert_eq!(lines[1].find("ab12").unwrap(), id_col);
        assert_eq!(lines[2].find("cd34").unwrap(), id_col);
        assert!(!lines[1].ends_with(' '), "no trailing padding");
    }

    #[test]
    fn sanitize_table_cell_escapes_newlines() {
        assert_eq!(sanitize_table_cell("a\nb\rc"), "a\\nb\\rc");
    }

    #[test]
    fn format_relative_time_covers_unit_boundaries() {
        let cases = [
            (None, "-"),
            (Some(0), "1s ago"),
            (Some(59_000), "59s ago"),
            (Some(60_000), "1m ago"),
            (Some(3_600_000), "1h ago"),
            (Some(86_400_000), "1d ago"),
            (Some(604_800_000), "1w ago"),
        ];
        for (age_ms, expected) in cases {
            assert_eq!(format_relative_time(age_ms), expected);
        }
    }

    #[test]
    fn relative_timestamp_tolerates_garbage() {
        assert_eq!(format_relative_from_timestamp("not a timestamp"), "-");
    }

    #[test]
    fn error_text_carries_hint_and_path_lines() {
        let err = Error::new(ErrorKind::Io)
            .with_message("failed to read input file")
            .with_path("/tmp/missing.txt")
            .with_hint("Check the path.");
        let text = error_text(&err, false);
        assert!(text.contains("error: failed to read input file"));
        assert!(text.contains("hint: Check the path."));
        assert!(text.contains("path: /tmp/missing.txt"));
        assert!(!text.contains("\u{1b}["));
    }

    #[test]
    fn error_text_colors_labels_when_enabled() {
        let err = Error::new(ErrorKind::Usage).with_message("bad flag");
        let text = error_text(&err, true);
        assert!(text.contains("\u{1b}[31merror:\u{1b}[0m"));
    }

    #[test]
    fn error_json_nests_under_error_key() {
        let err = Error::new(ErrorKind::Corrupt)
            .with_message("invalid product record on line 3")
            .with_hint("Inspect the store.");
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "Corrupt");
        assert_eq!(value["error"]["message"], "invalid product record on line 3");
        assert_eq!(value["error"]["hint"], "Inspect the store.");
    }

    #[test]
    fn name_from_model_output_reads_name_field() {
        let name =
            name_from_model_output("```json\n{\"name\": \"gadget\"}\n```", ColorMode::Never)
                .unwrap();
        assert_eq!(name, "gadget");
    }

    #[test]
    fn name_from_model_output_rejects_non_object() {
        let err = name_from_model_output("[1, 2]", ColorMode::Never).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn name_from_model_output_rejects_missing_name() {
        let err = name_from_model_output("{\"sku\": \"x\"}", ColorMode::Never).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn name_from_model_output_rejects_non_string_name() {
        let err = name_from_model_output("{\"name\": 7}", ColorMode::Never).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn name_from_model_output_rejects_garbage() {
        let err = name_from_model_output("not json", ColorMode::Never).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn product_json_includes_created() {
        let product = Product {
            id: "ab".repeat(16),
            name: "widget".to_string(),
            status: "active".to_string(),
            created: "2026-01-01T00:00:00Z".to_string(),
        };
        let value = product_json(&product);
        assert_eq!(value["name"], "widget");
        assert_eq!(value["status"], "active");
        assert_eq!(value["created"], "2026-01-01T00:00:00Z");
    }

    #[test]
    fn serve_config_requires_parseable_bind() {
        let run = ServeRunArgs {
            bind: "nonsense".to_string(),
            allow_non_loopback: false,
            cors_origin: Vec::new(),
            max_body_bytes: 1_048_576,
        };
        let err = serve_config_from_run_args(run, Path::new("/tmp/catalog")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.hint().unwrap().contains("host:port"));
    }

    #[test]
    fn serve_config_carries_run_args() {
        let run = ServeRunArgs {
            bind: "127.0.0.1:9900".to_string(),
            allow_non_loopback: true,
            cors_origin: vec!["https://app.example".to_string()],
            max_body_bytes: 2048,
        };
        let config = serve_config_from_run_args(run, Path::new("/tmp/catalog")).unwrap();
        assert_eq!(config.bind.port(), 9900);
        assert!(config.allow_non_loopback);
        assert_eq!(config.cors_origins, vec!["https://app.example".to_string()]);
        assert_eq!(config.max_body_bytes, 2048);
        assert_eq!(config.catalog_dir, Path::new("/tmp/catalog"));
    }

    #[test]
    fn cli_parses_add_with_from_model() {
        let cli = Cli::try_parse_from(["stocklet", "add", "--from-model", "{}"]).unwrap();
        match cli.command {
            Command::Add {
                name,
                from_model,
                url,
            } => {
                assert!(name.is_none());
                assert_eq!(from_model.as_deref(), Some("{}"));
                assert!(url.is_none());
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn cli_rejects_name_combined_with_from_model() {
        let err =
            Cli::try_parse_from(["stocklet", "add", "widget", "--from-model", "{}"]).unwrap_err();
        assert_eq!(err.kind(), ClapErrorKind::ArgumentConflict);
    }

    #[test]
    fn clap_error_hint_names_failing_subcommand() {
        let err = Cli::try_parse_from(["stocklet", "serve", "--bogus"]).unwrap_err();
        let hint = clap_error_hint(&err);
        assert_eq!(hint, "Try `stocklet serve --help`.");
    }

    #[test]
    fn clap_error_summary_strips_error_prefix() {
        let err = Cli::try_parse_from(["stocklet", "--bogus-flag"]).unwrap_err();
        let summary = clap_error_summary(&err);
        assert!(!summary.starts_with("error:"));
        assert!(!summary.is_empty());
    }
}
