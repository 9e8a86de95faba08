use intent_router::config::RouterConfig;
use intent_router::error::{Error, Result};
use intent_router::llm::{LlmConfig, create_provider};
use intent_router::routing::Orchestrator;
use intent_router::session::Session;
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| Error::Tls("a crypto provider is already installed".to_string()))?;

    // Initialize tracing (stderr, so it never interleaves with replies)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let llm_config = match LlmConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("  export ANTHROPIC_API_KEY=sk-ant-...");
            eprintln!("  (or INTENT_ROUTER_BACKEND=openai with OPENAI_API_KEY)");
            std::process::exit(1);
        }
    };
    let config = RouterConfig::from_env()?;

    eprintln!("🧭 Intent Router v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", llm_config.model);
    eprintln!(
        "   Default category: {}",
        config.default_category
    );
    eprintln!("   Type a message and press Enter. '{}' to quit.\n", config.exit_command);

    let llm = create_provider(&llm_config)?;
    let orchestrator = Orchestrator::from_config(llm, &config);

    let mut session = Session::new(&orchestrator, config.exit_command.clone());
    session
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    Ok(())
}
