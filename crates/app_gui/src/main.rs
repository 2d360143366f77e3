mod app;

use app::UiApp;
use cauli_core::ClientConfig;
use cauli_core::config::{ENV_BACKEND_URL, ENV_PROGRESS, ENV_TIMEOUT_SECS};
use eframe::{NativeOptions, egui};
use tracing_subscriber::EnvFilter;

/// Values baked in by `build.rs`.
fn build_time_value(key: &str) -> Option<String> {
    let value = match key {
        ENV_BACKEND_URL => env!("CAULI_BUILD_BACKEND_URL"),
        ENV_TIMEOUT_SECS => env!("CAULI_BUILD_TIMEOUT_SECS"),
        ENV_PROGRESS => env!("CAULI_BUILD_PROGRESS"),
        _ => return None,
    };
    Some(value.to_string())
}

/// Build-time values first, then runtime environment overrides. Bad values are logged and skipped.
fn load_config() -> ClientConfig {
    let built = ClientConfig::from_lookup(build_time_value, ClientConfig::default())
        .unwrap_or_else(|e| {
            tracing::error!("Ignoring build-time configuration: {e}");
            ClientConfig::default()
        });
    ClientConfig::from_lookup(|key| std::env::var(key).ok(), built.clone()).unwrap_or_else(|e| {
        tracing::error!("Ignoring runtime configuration: {e}");
        built
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config();
    tracing::info!(
        "Backend {} (timeout {:?}, {} progress)",
        config.predict_url(),
        config.timeout,
        config.progress_mode.as_str()
    );

    if let Err(e) = run(config) {
        tracing::error!("Application stopped with error: {e:#}");
    }
}

fn run(config: ClientConfig) -> anyhow::Result<()> {
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("cauliflowerAI")
            .with_inner_size([1100.0, 860.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "cauliflowerAI",
        options,
        Box::new(|_cc| {
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(Box::new(UiApp::new(config)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("eframe: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_time_values_cover_every_config_key() {
        for key in [ENV_BACKEND_URL, ENV_TIMEOUT_SECS, ENV_PROGRESS] {
            assert!(build_time_value(key).is_some(), "{key} not baked in");
        }
        assert!(build_time_value("CAULI_UNKNOWN").is_none());
    }

    #[test]
    fn baked_in_values_parse() {
        assert!(ClientConfig::from_lookup(build_time_value, ClientConfig::default()).is_ok());
    }
}
