use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subextract::cli::{Cli, Commands};
use subextract::config::Config;
use subextract::extract::ExtractionPipeline;
use subextract::{output, utils};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "subextract=debug" } else { "subextract=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("SUBEXTRACT_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Extract {
            paths,
            output_dir,
            naming,
            dry_run,
            no_overwrite,
            recursive,
            format,
        } => {
            warn_missing_dependencies(&config, !dry_run).await;

            naming.apply(&mut config.naming);
            if no_overwrite {
                config.app.overwrite = false;
            }
            config.validate()?;

            let inputs = utils::collect_inputs(&paths, recursive || config.app.recursive)?;
            tracing::info!("Processing {} file(s)", inputs.len());

            let pipeline = ExtractionPipeline::new(config).with_progress(!cli.quiet);
            let summary = pipeline
                .extract_many(&inputs, output_dir.as_deref(), dry_run)
                .await;

            output::print_summary(&summary, &format)?;

            if summary.has_failures() {
                anyhow::bail!("{} file(s) failed", summary.failures.len());
            }
        }
        Commands::Test {
            paths,
            recursive,
            format,
        } => {
            warn_missing_dependencies(&config, false).await;

            let inputs = utils::collect_inputs(&paths, recursive || config.app.recursive)?;
            let pipeline = ExtractionPipeline::new(config);

            let mut tests = Vec::with_capacity(inputs.len());
            for input in &inputs {
                match pipeline.test_file(input).await {
                    Ok(test) => tests.push(test),
                    Err(e) => tracing::warn!("Could not test {}: {:#}", input.display(), e),
                }
            }

            output::print_tests(&tests, &format)?;
        }
        Commands::Probe {
            file,
            output_dir,
            naming,
            format,
        } => {
            warn_missing_dependencies(&config, false).await;
            utils::check_file_accessible(&file)?;

            naming.apply(&mut config.naming);
            config.validate()?;

            let pipeline = ExtractionPipeline::new(config);
            let plan = pipeline.plan(&file, output_dir.as_deref()).await?;

            output::print_plan(&plan, &format)?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                match &cli.config {
                    Some(path) => {
                        config.save_to(path).await?;
                        println!("Configuration written to: {}", path.display());
                    }
                    None => {
                        config.save().await?;
                        println!("Configuration written to: {}", Config::config_path()?.display());
                    }
                }
                println!("Edit the file to change the defaults, or override them per run with flags.");
            }
        }
    }

    Ok(())
}

async fn warn_missing_dependencies(config: &Config, need_ffmpeg: bool) {
    let missing = utils::check_dependencies(&config.app, need_ffmpeg).await;

    if !missing.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }
}
