mod admin;
mod app;
mod auth;
mod config;
mod contacts;
mod crisis;
mod db;
mod discover;
mod error;
mod forums;
mod geo;
mod matching;
mod payments;
mod professionals;
mod ratings;
mod recordings;
mod seed;
mod sessions;
mod state;
mod users;
mod wallet;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "timerent=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    sqlx::migrate!("./migrations").run(&app_state.db).await?;
    tracing::info!("migrations applied");

    if std::env::args().nth(1).as_deref() == Some("seed") {
        let created = seed::run(&app_state.db).await?;
        tracing::info!(created, "sample data loaded");
        return Ok(());
    }

    app::serve(app::build_app(app_state)).await
}
