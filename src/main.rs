use falbench::{client::CREDENTIAL_KEY, prelude::*};
use std::io::Write;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenv::dotenv();

    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("falbench=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("FAL AI Multi-Model Experiment Generator");
    println!("{}", "=".repeat(50));

    let api_key = match dotenv::var(CREDENTIAL_KEY) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => match ask_api_key() {
            Ok(key) if !key.is_empty() => key,
            _ => {
                eprintln!("Error: API key is required!");
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = run(&api_key).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(api_key: &str) -> Result<()> {
    let generator = Generator::new(Client::new(Some(api_key))?)?;
    println!("FAL AI client initialized successfully!");

    return Session::stdio(generator).run().await;
}

fn ask_api_key() -> std::io::Result<String> {
    print!("Enter your FAL AI API key: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    return Ok(line.trim().to_string());
}
