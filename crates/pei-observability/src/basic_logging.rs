use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Console-only logging for builds or runs without full observability.
///
/// - **Log Level**: `LOG_LEVEL` (default: "info")
/// - **Filtering**: noisy dependencies are held at warn
/// - **Format**: compact, with module targets and source locations
pub fn init_basic_console_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "pei_access={level},pei_authz={level},pei_db={level},tower_http=warn,hyper=warn,tonic=warn,h2=warn,sqlx=warn",
            level = log_level
        ))
    });

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(true)
        .with_filter(env_filter);

    // try_init: tests may install a subscriber first.
    let _ = tracing_subscriber::registry().with(console_layer).try_init();

    eprintln!("ℹ️  Observability disabled - console logging only");
}
