use anyhow::Context;
use leadbase_app::SmokeRunner;
use leadbase_kernel::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load leadbase settings")?;
    leadbase_telemetry::init(&settings.telemetry);

    tracing::info!(env = ?settings.environment, "leadbase-smoke starting");

    let client = leadbase_app::connect(&settings)?;

    let mut stdout = std::io::stdout();
    let report = SmokeRunner::new(client)
        .run(&mut stdout)
        .await
        .with_context(|| "failed to write smoke test report")?;

    // Step failures are reported, not turned into an exit status.
    tracing::info!(
        passed = report.passed(),
        failed = report.failed(),
        aborted = report.aborted,
        "leadbase-smoke finished"
    );
    Ok(())
}
