use anyhow::Context;
use bookit_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load BookIT settings")?;
    let _log_guard = bookit_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.path,
        "bookit-app bootstrap starting"
    );

    bookit_app::serve(settings).await
}
