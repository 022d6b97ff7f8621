// Re-export CLI types from the pagelens-cli crate (shared with build.rs and gen_docs).
pub use pagelens_cli::{
    parse_filter_arg, parse_search_arg, render_options_markdown, Args, OutputFormat,
};
