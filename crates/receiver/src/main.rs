use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Parser;
use signed_webhook::{
    ApproveAll, AppState, StaticKeyRegistry,
    logging::{self, LogFormat},
    run,
    server::DEFAULT_MAX_BODY_BYTES,
};
use tracing::info;

#[derive(Parser)]
struct Args {
    #[clap(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,
    #[clap(long, env = "PORT", default_value = "1080")]
    port: u16,

    /// JSON object mapping api key ids to base64 secrets.
    #[clap(long, env = "API_KEYS_FILE")]
    keys_file: Option<PathBuf>,
    /// A single api key id, registered alongside the key file.
    #[clap(long, env = "API_KEY", requires = "api_secret")]
    api_key: Option<String>,
    /// Base64 secret for `--api-key`.
    #[clap(long, env = "API_SECRET", requires = "api_key", hide_env_values = true)]
    api_secret: Option<String>,

    #[clap(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,
    #[clap(long, env = "LOG_FORMAT", value_enum, default_value = "text")]
    log_format: LogFormat,
}

impl Args {
    fn key_registry(&self) -> Result<StaticKeyRegistry> {
        let mut registry = match &self.keys_file {
            Some(path) => StaticKeyRegistry::from_json_file(path)?,
            None => StaticKeyRegistry::default(),
        };
        if let (Some(api_key), Some(api_secret)) = (&self.api_key, &self.api_secret) {
            let inline =
                StaticKeyRegistry::from_encoded([(api_key.clone(), api_secret.clone())])?;
            registry = registry.merge(inline);
        }
        if registry.is_empty() {
            bail!("no api keys configured; pass --keys-file or --api-key/--api-secret");
        }
        Ok(registry)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_format);

    let registry = args.key_registry()?;
    info!(keys = registry.len(), "Loaded api keys");

    let state = AppState::new(Arc::new(registry), Arc::new(ApproveAll));
    run(args.host, args.port, state, args.max_body_bytes).await
}
