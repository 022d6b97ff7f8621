//! Shared CLI definitions for pagelens.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{ArgAction, CommandFactory, Parser, ValueEnum};

/// How the explored view is printed
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned text table with a summary line
    #[default]
    Table,
    /// JSON document with rows, columns and summary
    Json,
}

/// Command-line arguments for pagelens
#[derive(Clone, Parser, Debug)]
#[command(
    name = "pagelens",
    version,
    about = "Explore paged record collections: filter, project columns, select rows"
)]
pub struct Args {
    /// Path to a JSON file holding the records (an array, or an object with an `items` array).
    /// Not required with --generate-config
    #[arg(required_unless_present = "generate_config", value_name = "PATH")]
    pub path: Option<std::path::PathBuf>,

    /// Number of records fetched per page (overrides config [paging] page_size)
    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<usize>,

    /// Number of additional pages to load after the initial page
    #[arg(long = "pages", value_name = "N")]
    pub pages: Option<usize>,

    /// Discrete filter as NAME=VALUE (e.g. status=paid). Repeatable
    #[arg(long = "filter", value_name = "NAME=VALUE")]
    pub filter: Vec<String>,

    /// Smart filter as FIELD:QUERY (case-insensitive substring, e.g. email:ann)
    #[arg(long = "search", value_name = "FIELD:QUERY")]
    pub search: Option<String>,

    /// Comma-separated list of visible column keys (catalogue order is kept)
    #[arg(long = "columns", value_name = "KEYS", value_delimiter = ',')]
    pub columns: Option<Vec<String>>,

    /// Select a record by identity. Repeatable
    #[arg(long = "select", value_name = "ID")]
    pub select: Vec<String>,

    /// Name of the identity field on each record (overrides config [records] identity_field)
    #[arg(long = "identity-field", value_name = "FIELD")]
    pub identity_field: Option<String>,

    /// Output format
    #[arg(long = "output", value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Generate default configuration file at ~/.config/pagelens/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Split a `NAME=VALUE` filter argument. The first `=` separates name from value.
pub fn parse_filter_arg(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}

/// Split a `FIELD:QUERY` search argument. The first `:` separates field from query.
pub fn parse_search_arg(raw: &str) -> Option<(String, String)> {
    let (field, query) = raw.split_once(':')?;
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    Some((field.to_string(), query.to_string()))
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Render command-line options as markdown.
///
/// Used by the gen_docs binary; output is written to stdout.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let option_str = if arg.is_positional() {
            let placeholder = value_placeholder(arg);
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            let placeholder = if arg.get_action().takes_values() {
                value_placeholder(arg)
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
