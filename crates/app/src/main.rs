use engine::Engine;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "colletta={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let engine = Engine::builder()
        .campaign(&settings.campaign.name, &settings.campaign.currency)
        .build()?;
    tracing::info!(
        "Campaign \"{}\" ready to accept donations",
        settings.campaign.name
    );

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}
