use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use wpreader::app::AppContext;
use wpreader::cli::{commands, Cli, Commands};
use wpreader::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stderr shares the screen with the TUI, so log only for one-shot commands.
    let stderr_logs = (!cli.is_interactive()).then(|| fmt::layer().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(stderr_logs)
        .with(EnvFilter::from_default_env())
        .init();

    let mut config = Config::load()?;
    cli.apply_overrides(&mut config.site);

    let ctx = AppContext::new(config.site.clone())?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::List { page, json } => {
            commands::list_posts(&ctx, page, json).await?;
        }
        Commands::Show { slug } => {
            commands::show_post(&ctx, &slug).await?;
        }
        Commands::Open { slug } => {
            commands::open_post(&ctx, &slug)?;
        }
        Commands::Tui => {
            wpreader::tui::run(Arc::new(ctx), Arc::new(config)).await?;
        }
    }

    Ok(())
}
