use anyhow::Result;
use exceldash::config::{Config, BIND_PORT};
use exceldash::dashboard::{self, DashboardState};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) read configuration ───────────────────────────────────────
    let config = Config::from_env()?;
    let advertised_port = config
        .advertised_port
        .clone()
        .unwrap_or_else(|| BIND_PORT.to_string());
    info!(
        sheet = %config.sheet_name,
        workbook = %config.workbook_path.display(),
        "configured"
    );

    // ─── 3) first pipeline run so the initial page has data ──────────
    let state = DashboardState::new(config);
    let snapshot = state.refresh().await;
    if !snapshot.error.is_empty() {
        info!("initial refresh reported: {}", snapshot.error);
    }

    // ─── 4) serve the dashboard ──────────────────────────────────────
    let routes = dashboard::routes(state);
    println!("Aplicación corriendo en http://localhost:{}", advertised_port);
    info!("serving dashboard on 0.0.0.0:{}", BIND_PORT);
    warp::serve(routes).run(([0, 0, 0, 0], BIND_PORT)).await;

    Ok(())
}
