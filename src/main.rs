use hfrl_hub::api::ApiClient;
use hfrl_hub::config::Config;
use hfrl_hub::credentials::CredentialStore;
use hfrl_hub::generate::{GenerationController, Origin};
use hfrl_hub::mock::MockGenerator;
use hfrl_hub::registry::Registry;
use hfrl_hub::ui::TracingSink;

/// One-shot demo driver: `hfrl-hub <model-id> <prompt...>`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let model = args.next();
    let prompt = args.collect::<Vec<_>>().join(" ");

    let registry = Registry::builtin();
    if model.is_none() {
        eprintln!("usage: hfrl-hub <model-id> <prompt...>");
        eprintln!("models:");
        for m in registry.list() {
            eprintln!("  {} ({}): {}", m.id, m.provider, m.description);
        }
        std::process::exit(2);
    }

    let config = Config::load();
    tracing::info!("backend: {}", config.base_url);

    let api = ApiClient::new(&config.base_url, config.request_timeout);
    let credentials = CredentialStore::new(config.credentials_path.clone());
    let mock = MockGenerator::new(config.mock_tick);
    let controller = GenerationController::new(api, credentials, mock);

    let sink = TracingSink;
    let generation = controller
        .generate(&registry, model.as_deref(), &prompt, None, None, &sink)
        .await?;

    if generation.origin == Origin::MockFallback {
        tracing::warn!("backend unreachable, showing canned demo output");
    }
    println!("{}", generation.content);

    Ok(())
}
