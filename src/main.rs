use anyhow::Context;
use snake_identifier::{logging, server, OpenRouterClient, ServiceConfig, SnakeIdentifier};
use tracing::warn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env().context("invalid configuration")?;
    logging::init_logging(&config.log_level, config.log_json);

    if config.openrouter.api_key().is_none() {
        warn!(
            "{} is not set; identification requests will fail until it is configured",
            snake_identifier::config::API_KEY_VAR
        );
    }

    let identifier = SnakeIdentifier::new(OpenRouterClient::new(config.openrouter));

    server::serve(config.bind, identifier)
        .await
        .with_context(|| format!("server on {} failed", config.bind))
}
