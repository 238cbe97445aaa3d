use trip_intake::config::IntakeConfig;
use trip_intake::dialogue::{DialogueEngine, SlotSchema};
use trip_intake::gateway::create_gateway;
use trip_intake::presenter::{self, SessionEnd};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the conversation.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = IntakeConfig::from_env()?;

    eprintln!("✈️  Trip Intake v{}", env!("CARGO_PKG_VERSION"));
    match config.webhook_url {
        Some(_) => eprintln!(
            "   Intake: webhook (timeout: {})",
            config
                .timeout
                .map(|t| format!("{}s", t.as_secs()))
                .unwrap_or_else(|| "none".to_string())
        ),
        None => eprintln!(
            "   Intake: simulated ({} after {}ms)",
            config.simulated_outcome,
            config.simulated_delay.as_millis()
        ),
    }
    eprintln!("   Action: {}", config.action);
    eprintln!("   Answer each question and press Enter. /quit to exit.");

    let gateway = create_gateway(&config);
    let (engine, opening) = DialogueEngine::start(SlotSchema::trip_planning(), gateway, config.action.clone());

    let mut stdout = std::io::stdout();
    let end = presenter::run_session(engine, &opening, presenter::stdin_lines(), &mut stdout).await?;

    if end == SessionEnd::Abandoned {
        eprintln!("Session ended before your trip was submitted.");
    }

    Ok(())
}
