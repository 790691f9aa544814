use community_client::cli::{parse_args, CliCommand, USAGE, VERSION};
use community_client::{subscriber, ChangeStreamListener, ClientConfig, CommunityClient};

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout carries only events.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(endpoint: Option<String>) -> Result<ClientConfig> {
    let config = match endpoint {
        Some(endpoint) => {
            let config = ClientConfig::new(endpoint);
            config.validate()?;
            config
        }
        None => ClientConfig::from_env()?,
    };
    Ok(config.with_user_agent(format!("community-listen/{}", VERSION)))
}

fn start_listeners(
    client: &CommunityClient,
    resources: &[String],
) -> Result<Vec<ChangeStreamListener>> {
    let mut listeners = Vec::with_capacity(resources.len());
    for resource in resources {
        let name = resource.clone();
        let listener = client.listen(
            resource,
            vec![subscriber(move |notification| match notification {
                Ok(event) => match serde_json::to_string(event) {
                    Ok(line) => println!("{}", line),
                    Err(e) => error!("Failed to serialize {} event: {}", name, e),
                },
                Err(err) => error!("{} change stream: {}", name, err),
            })],
        )?;
        listeners.push(listener);
    }
    Ok(listeners)
}

fn main() -> Result<()> {
    let (endpoint, resources) = match parse_args(std::env::args()) {
        CliCommand::Version => {
            println!("community-listen {}", VERSION);
            return Ok(());
        }
        CliCommand::Help => {
            print!("{}", USAGE);
            return Ok(());
        }
        CliCommand::Invalid(message) => {
            eprint!("{}\n\n{}", message, USAGE);
            std::process::exit(2);
        }
        CliCommand::Listen {
            endpoint,
            resources,
        } => (endpoint, resources),
    };

    color_eyre::install()?;
    init_tracing();

    let config = build_config(endpoint)?;
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async move {
        let client = CommunityClient::new(config)?;
        let listeners = start_listeners(&client, &resources)?;

        for listener in &listeners {
            let resource = listener.resource().to_string();
            let readiness = listener.readiness();
            tokio::spawn(async move {
                if readiness.wait().await.is_ok() {
                    info!("{} change stream established", resource);
                }
            });
        }

        tokio::signal::ctrl_c()
            .await
            .map_err(|e| eyre!("failed to wait for Ctrl-C: {}", e))?;
        info!("Interrupted, stopping {} listeners", listeners.len());

        for listener in listeners {
            listener.stop().await;
        }
        Ok::<(), color_eyre::Report>(())
    })
}
