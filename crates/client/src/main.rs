use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use signed_webhook::StaticKeyRegistry;
use signed_webhook::logging::{self, LogFormat};
use signed_webhook_client::{ProcessorClient, Route, ensure_verified};

#[derive(Debug, Clone, ValueEnum)]
enum RouteArg {
    Authorizations,
    Adjustments,
}

impl From<RouteArg> for Route {
    fn from(route: RouteArg) -> Self {
        match route {
            RouteArg::Authorizations => Route::Authorizations,
            RouteArg::Adjustments => Route::Adjustments,
        }
    }
}

#[derive(Parser)]
struct Args {
    #[clap(long, default_value = "127.0.0.1")]
    host: String,
    #[clap(long, default_value = "1080")]
    port: u16,
    #[clap(long, env = "API_KEY")]
    api_key: String,
    #[clap(long, env = "API_SECRET", hide_env_values = true)]
    api_secret: String,
    #[clap(long, value_enum, default_value = "authorizations")]
    route: RouteArg,
    /// File holding the JSON body to send. Defaults to `{}`.
    #[clap(long)]
    body_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(LogFormat::Text);

    let keys = StaticKeyRegistry::from_encoded([(args.api_key.clone(), args.api_secret)])?;
    let body = match &args.body_file {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("reading body file {}", path.display()))?,
        None => b"{}".to_vec(),
    };

    let client = ProcessorClient::new(
        format!("http://{}:{}", args.host, args.port),
        args.api_key,
        Arc::new(keys),
    );
    let reply = client.call(args.route.into(), body).await?;

    println!("{} {}", reply.status, String::from_utf8_lossy(&reply.body));
    ensure_verified(&reply)
}
