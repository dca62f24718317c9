use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `TAGTIMER_LOG` wins over the configured level.
pub fn init(configured_level: &str) {
    let level = std::env::var("TAGTIMER_LOG").unwrap_or_else(|_| configured_level.to_string());
    let filter = EnvFilter::try_new(format!("tagtimer_core={level},tagtimer={level}"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
