use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use foundry_responses::{
    DefaultCredential, Error, IssuerConfig, ResponsesIssuer, DEFAULT_API_VERSION,
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL, DEFAULT_PROMPT, DEFAULT_SCOPE,
};

/// Send one prompt to a Responses endpoint using Entra ID authentication.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Base URL, e.g. https://<resource>.services.ai.azure.com/api/projects/<project>/openai
    #[arg(long, env = "FOUNDRY_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "FOUNDRY_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, env = "FOUNDRY_MAX_OUTPUT_TOKENS", default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
    max_output_tokens: u32,

    /// Token audience
    #[arg(long, env = "FOUNDRY_SCOPE", default_value = DEFAULT_SCOPE)]
    scope: String,

    #[arg(long, env = "FOUNDRY_API_VERSION", default_value = DEFAULT_API_VERSION)]
    api_version: String,

    /// Use this bearer token before trying any other credential source
    #[arg(long, env = "FOUNDRY_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Timeout for each HTTP round-trip
    #[arg(long, env = "FOUNDRY_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,

    #[arg(default_value = DEFAULT_PROMPT)]
    prompt: String,
}

impl Cli {
    fn config(&self) -> Result<IssuerConfig, Error> {
        let mut builder = IssuerConfig::builder()
            .model(&self.model)
            .max_output_tokens(self.max_output_tokens)
            .scope(&self.scope)
            .api_version(&self.api_version)
            .timeout(Duration::from_secs(self.timeout_secs));
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url);
        }
        builder.build()
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let config = cli.config()?;
    let credential = DefaultCredential::chain(cli.access_token.clone());
    let issuer = ResponsesIssuer::new(config, Arc::new(credential))?;

    let reply = issuer.issue(&cli.prompt).await?;
    println!("{reply}");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
