//! Storyboard CLI binary.
//!
//! This binary provides command-line access to the storyboard engine:
//! - Plan a storyboard's phases, camera angles and scenes
//! - Generate a storyboard with the offline collaborators
//! - Show a saved storyboard
//! - Render seeded image variants

use clap::Parser;
use storyboard::{ObservabilityConfig, init_observability, shutdown_observability};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{
        Cli, Commands, load_config, plan_storyboard, render_image_variants, run_storyboard,
        show_storyboard,
    };

    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_observability(
        &ObservabilityConfig::default()
            .with_verbose(cli.verbose)
            .with_json_logs(cli.json_logs),
    )?;

    let result = match cli.command {
        Commands::Plan {
            frames,
            scenario,
            format,
        } => {
            let config = load_config(cli.config.as_deref())?;
            plan_storyboard(&config, &scenario, frames, format)
        }

        Commands::Run {
            frames,
            scenario,
            save,
            format,
        } => {
            let config = load_config(cli.config.as_deref())?;
            run_storyboard(config, &scenario, frames, save.as_deref(), format)
                .await
                .map(|_| ())
        }

        Commands::Show { run, dir, format } => show_storyboard(&run, &dir, format).await,

        Commands::Variants {
            prompt,
            count,
            seed,
            model,
            concurrency,
        } => {
            let config = load_config(cli.config.as_deref())?;
            render_image_variants(&config, &prompt, count, seed, model, concurrency)
                .await
                .map(|_| ())
        }
    };

    shutdown_observability();
    result?;
    Ok(())
}
