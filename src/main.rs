use tokio::signal;
use tokio_util::sync::CancellationToken;

use flex_dividends::config::{Config, NotifierKind};
use flex_dividends::flex::{FlexClient, FlexToken};
use flex_dividends::notify::{Notifier, SmtpNotifier, SmtpSettings, StdoutNotifier};
use flex_dividends::pipeline::{self, FlexQuery};
use flex_dividends::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let telemetry_guard = init_telemetry(&config)?;

    tracing::info!(
        environment = %config.environment,
        notifier = ?config.notifier,
        "Starting dividend service"
    );

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
        }
    });

    let flex = match config.flex_credentials() {
        Some((token, query_id)) => Some((
            FlexClient::from_config(&config, FlexToken::new(token), cancel.clone())?,
            query_id,
        )),
        None => None,
    };
    let query = flex.as_ref().map(|(client, query_id)| FlexQuery {
        client,
        query_id: *query_id,
    });

    let notifier: Option<Box<dyn Notifier>> = match config.notifier {
        NotifierKind::Stdout => Some(Box::new(StdoutNotifier::new())),
        NotifierKind::Smtp => match SmtpSettings::from_config(&config) {
            Some(settings) => Some(Box::new(SmtpNotifier::new(&settings)?)),
            None => {
                tracing::error!(
                    "Incomplete mail configuration, check SENDER_EMAIL, RECIPIENT_EMAIL, \
                     SMTP_USERNAME and SMTP_PASSWORD"
                );
                None
            }
        },
    };

    let today = chrono::Local::now().date_naive();
    let result = pipeline::run(query, notifier.as_deref(), today).await;

    match &result {
        Ok(summary) => tracing::info!(
            dividends = summary.dividends,
            example_data = summary.used_example_data,
            delivered = summary.delivered,
            "Dividend service finished"
        ),
        Err(err) => tracing::error!(error = %err, "Dividend service failed"),
    }

    telemetry_guard.shutdown();

    result?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling");
}
