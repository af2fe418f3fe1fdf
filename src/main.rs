use clap::Parser;
use game_link::cli::{Cli, Commands};
use game_link::config::Config;
use game_link::ws::{ReconnectingClient, TungsteniteConnector};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).unwrap_or_default()
    });

    // Initialize telemetry
    let _telemetry = game_link::telemetry::init_telemetry(&config.telemetry)?;

    if let Commands::Config = cli.command {
        println!("Current configuration:");
        println!("  WebSocket: {}", config.server.ws_url);
        println!("  HTTP: {}", config.server.http_base_url);
        println!(
            "  Reconnect: {} (delay {}ms)",
            config.server.auto_reconnect, config.server.reconnect_delay_ms
        );
        println!("  Log level: {}", config.telemetry.log_level);
        return Ok(());
    }

    // One client per process, handed to whichever command needs it
    let connector = TungsteniteConnector::new().ping_interval(config.server.ping_interval());
    let client = ReconnectingClient::with_connector(config.server.client_config(), connector)?;

    match cli.command {
        Commands::Connect(args) => {
            tracing::info!(url = %client.url(), "Starting session");
            args.execute(&client).await?;
        }
        Commands::Send(args) => args.execute(&client).await?,
        Commands::Fetch(args) => args.execute(&client).await?,
        Commands::Config => {}
    }

    Ok(())
}
