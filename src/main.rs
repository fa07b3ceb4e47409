use anyhow::Result;
use events::ListenerRegistry;
use log::*;
use service::{config::Config, logging::Logger};
use sse::{Credentials, HttpTransport, ListenerConfig, ReconnectPolicy, StreamListener};
use std::sync::Arc;

mod listeners;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new();
    Logger::init_logger(&config)?;

    let credentials = Credentials::new(config.li_at()?, config.jsessionid()?);
    let transport = HttpTransport::new(
        config.realtime_url(),
        &credentials,
        config.connect_timeout(),
    )?;

    let registry = Arc::new(ListenerRegistry::new());
    listeners::register_logging_listeners(&registry);

    info!("Listening to {}", transport.url());
    let handle = StreamListener::new(Arc::new(transport), registry, listener_config(&config)).spawn();

    let cancel = handle.cancellation_token();
    let shutdown = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, stopping event stream listener");
                cancel.cancel();
            }
            Err(e) => error!("Unable to listen for Ctrl-C: {e}"),
        }
    });

    handle.join().await;
    shutdown.abort();

    Ok(())
}

fn listener_config(config: &Config) -> ListenerConfig {
    ListenerConfig {
        connect_timeout: config.connect_timeout(),
        idle_timeout: config.idle_timeout(),
        reconnect: ReconnectPolicy {
            base_delay: config.backoff_initial_delay(),
            max_delay: config.backoff_max_delay(),
            max_failures: config.max_consecutive_failures,
        },
    }
}
