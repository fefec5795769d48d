#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tidecrm_observability::init();

    let config = tidecrm_api::AppConfig::from_env()?;
    let bind = config.bind.clone();
    let app = tidecrm_api::build_app(config);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
