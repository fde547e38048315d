//! Replays one stored provider webhook delivery.
//!
//! Reads an event envelope (JSON) from stdin and dispatches it against the
//! configured database, exactly as the webhook endpoint would.
//!
//! ```text
//! subscription-sync < evt_1PqR.json
//! ```

use std::io::Read;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use subscription_sync::adapters::PostgresBillingUnitOfWork;
use subscription_sync::application::{DispatchOutcome, WebhookDispatcher};
use subscription_sync::config::{init_tracing, AppConfig};
use subscription_sync::domain::billing::{EventEnvelope, PayloadDeserializer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    config.validate().context("validating configuration")?;
    init_tracing(&config.logging);

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .context("connecting to database")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("running migrations")?;
        info!("Migrations applied");
    }

    let dispatcher = WebhookDispatcher::with_standard_handlers(
        Arc::new(PostgresBillingUnitOfWork::new(pool)),
        PayloadDeserializer::new(config.payment.api_version.clone()),
    )?;

    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("reading event from stdin")?;
    let event: EventEnvelope = serde_json::from_str(&raw).context("parsing event envelope")?;

    match dispatcher.handle(&event).await {
        Ok(DispatchOutcome::Handled(kind)) => {
            info!(event_id = %event.id, %kind, "Replay handled");
            Ok(())
        }
        Ok(DispatchOutcome::Skipped) => {
            info!(event_id = %event.id, event_type = %event.event_type, "Replay skipped");
            Ok(())
        }
        Err(err) if err.is_processing_error() => {
            warn!(
                event_id = %event.id,
                status = %err.status_code(),
                error = %err,
                "Replay acknowledged without changes"
            );
            Ok(())
        }
        Err(err) => Err(anyhow::Error::new(err).context(format!("replaying event {}", event.id))),
    }
}
