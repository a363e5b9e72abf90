use anyhow::Context;
use clap::{Parser, Subcommand};
use leadbase_app::SmokeRunner;
use leadbase_kernel::Settings;

#[derive(Debug, Parser)]
#[command(name = "leadbase", version, about = "Connectivity checks for the leads database")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate credentials and build the client handle without sending requests
    Check,
    /// Run the insert/select/update/delete smoke test against the live tables
    Smoke,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load leadbase settings")?;
    leadbase_telemetry::init(&settings.telemetry);

    let client = leadbase_app::connect(&settings)?;

    match cli.command {
        Command::Check => {
            println!("✅ Supabase client initialized successfully");
            println!("📍 Connected to: {}", client.configured_url());
        }
        Command::Smoke => {
            let mut stdout = std::io::stdout();
            let report = SmokeRunner::new(client)
                .run(&mut stdout)
                .await
                .with_context(|| "failed to write smoke test report")?;
            tracing::info!(
                passed = report.passed(),
                failed = report.failed(),
                aborted = report.aborted,
                "smoke test finished"
            );
        }
    }

    Ok(())
}
