mod config;
mod error;
mod handler;
mod message;
mod notify;
mod storage;
mod webhook;

use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing_subscriber::filter;

use clickops_filter::{AccountKeyFilter, EventClassifier, RuleTables};

use config::Config;
use handler::Handler;
use notify::WebhookNotifier;
use storage::S3ObjectStore;
use webhook::{SsmSecretSource, WebhookResolver};


#[tokio::main]
async fn main() -> Result<(), Error> {

    tracing_subscriber::fmt()
        .with_level(true)
        .with_max_level(filter::LevelFilter::INFO)
        // CloudWatch stamps every line itself
        .without_time()
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    let rules = RuleTables::default().compile().map_err(error::ConfigError::from)?;
    let aws_config = aws_config::load_from_env().await;

    tracing::info!(
        "Starting ClickOps notifier, excluded accounts {:?}, included accounts {:?}",
        config.excluded_accounts,
        config.included_accounts
    );

    let handler = Handler {
        webhook: WebhookResolver::new(SsmSecretSource::new(&aws_config), config.webhook_parameter),
        store: S3ObjectStore::new(&aws_config, config.use_path_style_buckets),
        notifier: WebhookNotifier::new(reqwest::Client::new()),
        accounts: AccountKeyFilter::new(config.excluded_accounts, config.included_accounts),
        classifier: EventClassifier::new(rules),
    };
    let handler = &handler;

    run(service_fn(move |event: LambdaEvent<SqsEvent>| async move {
        handler.handle(event.payload).await.map_err(Error::from)
    }))
    .await
}
