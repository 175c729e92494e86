//! `cyclemate serve`: start the HTTP chat endpoint.

use std::path::Path;

use tracing::info;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        model = %config.provider.model,
        max_pairs = config.conversation.max_pairs,
        "Starting CycleMate gateway"
    );

    cyclemate_gateway::start(config).await?;

    Ok(())
}
