use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reelwise::{
    api::{create_router, AppState},
    config::Config,
    store::{load_or_sample, Catalog, DatasetLoader, JsonFileLoader},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reelwise=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let loader = config.dataset_path.as_deref().map(JsonFileLoader::new);
    let dataset = load_or_sample(loader.as_ref().map(|l| l as &dyn DatasetLoader));

    tracing::info!(
        movies = dataset.movie_count(),
        ratings = dataset.rating_count(),
        global_mean = dataset.global_mean_rating(),
        "Dataset ready"
    );

    let state = AppState::new(dataset, config.engine_settings())
        .with_default_limit(config.default_result_count);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
