use std::sync::Arc;
use std::time::Duration;

use filmoteca_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, load_catalog, Cache, SimilarityMatrix},
    init_tracing,
    services::OmdbProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    // Catalog and index are loaded once and frozen for the process lifetime
    let catalog = load_catalog(&config.catalog_path)?;
    let matrix = SimilarityMatrix::load(&config.similarity_path)?;

    let mut builder = AppState::builder(catalog, matrix)
        .artwork_timeout(Duration::from_millis(config.artwork_timeout_ms));

    if let Some(api_key) = config.omdb_api_key.clone() {
        let cache = match &config.redis_url {
            Some(url) => match Cache::connect(create_redis_client(url)?).await {
                Ok(cache) => Some(cache),
                Err(e) => {
                    tracing::warn!(error = %e, "Redis unavailable, poster caching disabled");
                    None
                }
            },
            None => None,
        };
        builder = builder.artwork(Arc::new(OmdbProvider::new(
            api_key,
            config.omdb_api_url.clone(),
            cache,
        )));
    } else {
        tracing::info!("OMDB_API_KEY not set, posters disabled");
    }

    let app = create_router(builder.build());

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
