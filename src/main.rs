use anyhow::{Context, Result};
use dominion_energy::config::Config;
use dominion_energy::logging::{get_logger, init_logging};
use dominion_energy::sensors::{ATTRIBUTION, sensor_states};
use dominion_energy::DominionClient;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    let logger = get_logger("main");
    logger.info("Dominion Energy client starting up");

    let mut client = DominionClient::new(config.credentials(), &config)
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    match config.account.token.as_deref() {
        Some(token) => client
            .set_token(token)
            .map_err(|e| anyhow::anyhow!("Invalid configured token: {}", e))?,
        None => {
            if let Err(e) = client.authenticate().await {
                logger.error(&format!("Authentication failed: {}", e));
                client.close().await;
                anyhow::bail!(
                    "Authentication failed: {}. Check the username and password, or set DOMINION_TOKEN",
                    e
                );
            }
        }
    }

    let result = client.fetch_all().await;
    client.close().await;

    let reading = match result {
        Ok(reading) => reading,
        Err(e) if e.is_auth() => {
            anyhow::bail!("Token rejected: {}. Re-authenticate to continue", e);
        }
        Err(e) => return Err(anyhow::anyhow!("Fetch failed: {}", e)),
    };

    let account = &config.account.account_number;
    let output = serde_json::json!({
        "attribution": ATTRIBUTION,
        "reading": reading,
        "sensors": sensor_states(&reading, account),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    logger.info("Poll complete");
    Ok(())
}
