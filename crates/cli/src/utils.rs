use std::path::Path;

/// Initializes a tracing Subscriber for logging
pub fn subscriber() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Disables terminal colors unless stdout is a color-capable terminal.
pub fn enable_paint() {
    let enable = yansi::Condition::os_support() && yansi::Condition::tty_and_color_live();
    yansi::whenever(yansi::Condition::cached(enable));
}

/// Loads a `.env` file from the current directory, if there is one.
///
/// Variables that are already set are not overridden.
pub fn load_dotenv() {
    let load = |dir: &Path| {
        if let Err(err) = dotenvy::from_path(dir.join(".env"))
            && !err.not_found()
        {
            warn!(%err, "failed to load .env");
        }
    };
    if let Ok(cwd) = std::env::current_dir() {
        load(&cwd);
    }
}
