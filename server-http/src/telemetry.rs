use shared::config::Environment;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over the per-environment
/// default level.
pub fn init_tracing(env: Environment) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(env)));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match env {
        Environment::Local => builder.init(),
        Environment::Dev | Environment::Prod => builder.json().init(),
    }
}

fn default_level(env: Environment) -> &'static str {
    match env {
        Environment::Local | Environment::Dev => "debug",
        Environment::Prod => "info",
    }
}
