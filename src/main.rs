use anyhow::Context;
use catastro::{configuration::get_configuration, services::Droid, startup::run};
use env_logger::Env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration.")?;

    let droid = Droid::connect(&configuration.browser)
        .await
        .context("Failed to start browser session")?;

    let summary = run(droid, &configuration).await?;
    log::info!("Processed {} references", summary.total());

    Ok(())
}
