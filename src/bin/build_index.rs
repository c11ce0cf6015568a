//! Offline similarity index build: reads the catalog CSV, writes the matrix.

use filmoteca_api::{
    config::Config, db::load_catalog, init_tracing, services::build_similarity_matrix,
};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let catalog = load_catalog(&config.catalog_path)?;
    if catalog.is_empty() {
        anyhow::bail!("catalog at {} has no rows", config.catalog_path);
    }

    let matrix = build_similarity_matrix(&catalog)?;
    matrix.save(&config.similarity_path)?;

    tracing::info!(
        rows = catalog.len(),
        output = %config.similarity_path,
        "Similarity index written"
    );

    Ok(())
}
