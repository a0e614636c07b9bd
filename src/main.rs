mod cli;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, UpdatePortArgs};
use swim::config::LogFormat;
use swim::selector::tui;
use swim::{DockerEngine, Step, Swim, SwimConfig, SwimError, UpdatePortRequest};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(SwimError::SelectionAborted(reason)) = err.downcast_ref::<SwimError>() {
                info!(%reason, "Nothing to do");
                eprintln!("No container selected ({reason}). Exiting.");
            } else {
                error!("{:#}", err);
                eprintln!("error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = SwimConfig::load(cli.config.as_deref()).map_err(SwimError::from)?;
    init_logging(&config, cli.verbose)?;
    debug!(?config, "Configuration loaded");

    let docker_host = cli.docker_host.or_else(|| config.docker_host.clone());

    match cli.command {
        Commands::UpdatePort(args) => {
            let request = update_port_request(args, &config);
            // Reject malformed mappings before touching the engine
            request.options()?;

            let swim = connect(docker_host.as_deref(), request.stop_timeout)?;
            let outcome = swim.update_port(&request, tui::select_container).await?;

            let plan = &outcome.plan;
            println!(
                "Container {} ({}) started from {} with new port mappings",
                plan.target_container_name,
                short(&outcome.new_container_id),
                plan.snapshot_image_ref
            );
            for (key, endpoints) in plan.merged_bindings.bindings() {
                for endpoint in endpoints {
                    println!("  {} -> {}", endpoint, key);
                }
            }
        }

        Commands::Ls => {
            let swim = connect(docker_host.as_deref(), config.stop_timeout())?;
            let containers = swim.list_containers().await?;

            if containers.is_empty() {
                info!("No running containers");
                return Ok(());
            }

            println!("{:<14} {:<30} {}", "CONTAINER ID", "NAME", "PORTS");
            for container in &containers {
                println!(
                    "{:<14} {:<30} {}",
                    container.short_id(),
                    container.display_name,
                    container.ports_label()
                );
            }
        }
    }

    Ok(())
}

fn update_port_request(args: UpdatePortArgs, config: &SwimConfig) -> UpdatePortRequest {
    let stop_timeout = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.stop_timeout());

    UpdatePortRequest {
        container: args.container,
        ports: args.ports,
        image_name: args.image,
        container_name: args.container_name,
        stop_timeout,
        force_overwrite: args.force,
    }
}

fn connect(host: Option<&str>, stop_timeout: Duration) -> Result<Swim<DockerEngine>> {
    let engine = DockerEngine::connect(host, stop_timeout)
        .map_err(|e| SwimError::engine(Step::Connect, e))?;
    Ok(Swim::new(engine))
}

fn init_logging(config: &SwimConfig, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { config.log_level.as_str() };
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(
        level
            .parse()
            .with_context(|| format!("Invalid log level '{level}'"))?,
    );

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
    Ok(())
}

fn short(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
