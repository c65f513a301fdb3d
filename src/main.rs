//! Focus Studio - A focus timer coordinator
//!
//! This is the main entry point for the focus-studio application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use focus_studio::{
    config::Config,
    state::{floating_text::DEFAULT_PHRASE, AppState, FloatingText, Viewport},
    api::create_router,
    services::{AudioOutput, BackgroundTrack, HttpSessionTracker, ProcessOutput, SessionTracker, SilentOutput},
    tasks::StatsSubscription,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_studio={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-studio server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, duration={}min, api={}",
          config.host, config.port, config.duration, config.api_base);

    let settings = config.timer_settings()?;
    let tracker: Arc<dyn SessionTracker> =
        Arc::new(HttpSessionTracker::new(&config.api_base, config.user_id.clone())?);

    let output: Box<dyn AudioOutput> = match &config.track {
        Some(track) => match ProcessOutput::new(&config.player, track.clone()) {
            Ok(output) => Box::new(output),
            Err(e) => {
                warn!("Background track disabled: {}", e);
                Box::new(SilentOutput)
            }
        },
        None => Box::new(SilentOutput),
    };
    let audio = BackgroundTrack::acquire(output, config.track.is_some());

    let floating_text = FloatingText::layout(DEFAULT_PHRASE, Viewport::default(), &mut rand::thread_rng());

    // Create application state
    let state = Arc::new(AppState::new(settings, Arc::clone(&tracker), audio, floating_text)?);

    if config.user_id.is_some() {
        state.attach_stats(StatsSubscription::spawn(tracker, config.stats_interval()));
    } else {
        info!("No user configured, stats refresh disabled");
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timer/start    - Start or continue the session");
    info!("  POST   /timer/pause    - Pause the countdown");
    info!("  POST   /timer/resume   - Resume the countdown");
    info!("  POST   /timer/complete - Finish the session early");
    info!("  POST   /timer/reset    - Abandon the session");
    info!("  GET    /timer/status   - Current timer and screen state");
    info!("  GET    /timer/text     - Floating phrase for the current frame");
    info!("  PUT    /timer/title    - Rename the current task");
    info!("  POST   /audio/toggle   - Toggle the background track");
    info!("  POST   /scan/open      - Open a scanning dialog");
    info!("  POST   /scan           - Submit a decoded payload");
    info!("  DELETE /card           - Dismiss the displayed card");
    info!("  GET    /stats          - Usage statistics");
    info!("  GET    /health         - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown();
    info!("Server shutdown complete");
    Ok(())
}
