//! Binary that emits command-line options markdown to stdout.
//!
//! Used by the docs build to regenerate the command-line reference page.

fn main() {
    print!("{}", pagelens_cli::render_options_markdown());
}
