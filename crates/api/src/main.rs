use catalog_infra::CatalogConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CatalogConfig::from_env()?;
    catalog_observability::init(config.log_format);

    let services = catalog_api::app::services::build_services(&config).await?;
    let app = catalog_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        persistent = config.use_persistent_stores(),
        "catalog api listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
