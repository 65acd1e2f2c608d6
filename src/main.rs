use std::io::{self, BufReader};

use ytm_transfer::auth::{connect_spotify, connect_ytmusic};
use ytm_transfer::config::utils::load_config_with_details;
use ytm_transfer::prompt::Prompter;
use ytm_transfer::reconciler::Reconciler;
use ytm_transfer::session::Session;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file if it exists
    let _ = dotenv::dotenv();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("Spotify to YouTube Music Transfer Tool");
    println!("======================================");

    let config = match load_config_with_details() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to start due to configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let mut prompter = Prompter::new(BufReader::new(io::stdin()), io::stdout());

    let spotify = match connect_spotify(&config, &mut prompter).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Spotify authentication failed: {}", e);
            std::process::exit(1);
        }
    };

    let ytmusic = match connect_ytmusic(&config, &mut prompter).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("YouTube Music authentication failed: {}", e);
            std::process::exit(1);
        }
    };

    let mut session = Session::new(Reconciler::new(&spotify, &ytmusic), prompter);
    if let Err(e) = session.run().await {
        log::error!("Session ended with an error: {}", e);
        std::process::exit(1);
    }

    log::info!("Goodbye");
}
