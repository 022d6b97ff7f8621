use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use pagelens::logging::{init_logging, LogConfig};
use pagelens::render::{render_json, render_table};
use pagelens::{
    drive, AppConfig, Args, ConfigManager, ExploreOptions, Explorer, MemorySource, OutputFormat,
    APP_NAME,
};
use std::io::{self, IsTerminal};
use tracing::{info, warn};

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let config_manager = ConfigManager::new(APP_NAME)?;
        let path = config_manager.write_default_config(args.force)?;
        println!("Configuration file written to {}", path.display());
        return Ok(Some(()));
    }
    Ok(None)
}

fn run(args: &Args, config: &AppConfig) -> Result<String> {
    let path = args
        .path
        .as_deref()
        .ok_or_else(|| eyre!("A path to a JSON record file is required"))?;
    let opts = ExploreOptions::from_args_and_config(args, config)?;

    let source = MemorySource::from_json_file(path)?;
    let initial = source.initial_page(opts.page_size);
    let mut explorer = Explorer::new(opts.profile(), opts.page_size, initial, source);
    info!(
        loaded = explorer.store().loaded(),
        total = explorer.store().total(),
        "Seeded explorer"
    );

    drive(&mut explorer, opts.intents())?;

    if let Some(message) = explorer.fetch_state().error() {
        warn!(%message, "Stopped on a failed page fetch");
    }

    let view = explorer.view();
    match opts.output {
        OutputFormat::Table => Ok(render_table(&view)),
        OutputFormat::Json => render_json(&view),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let config = AppConfig::load(APP_NAME)?;
    init_logging(
        &LogConfig::from_config(&config.logging, args.verbose)
            .with_ansi(io::stderr().is_terminal()),
    );

    let output = run(&args, &config)?;
    print!("{output}");
    Ok(())
}
