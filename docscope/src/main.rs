use anyhow::{Context, Result};

use docscope::{config::Settings, logging::init_tracing, queries::get_apartment_in_manhattan};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing()?;
    let settings = Settings::from_env();

    let json = get_apartment_in_manhattan(&settings)
        .await
        .context("geo query against TEST.airbnb failed")?;
    println!("{json}");

    Ok(())
}
