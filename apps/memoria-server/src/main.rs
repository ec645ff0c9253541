use memoria::logging;
use memoria::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; the real environment still applies.
    let _ = dotenvy::dotenv();
    logging::init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        origin = ?config.allowed_origin,
        rooms = config.rooms.len(),
        faces = ?config.face_source,
        deck_limit = config.deck.limit,
        "starting memoria server"
    );

    let server = MemoriaServerBuilder::from_config(&config)
        .build(config.face_source())
        .await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
        }
    }
    Ok(())
}
