use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use dingbot::commands::CommandRouter;
use dingbot::core::Config;
use dingbot::features::calc::ExprEvaluator;
use dingbot::features::reminders::ReminderScheduler;
use dingbot::irc::connection::report;
use dingbot::irc::{connect, NotificationSink, Session};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting dingbot with config {}", config.config_path);

    let scheduler = Arc::new(ReminderScheduler::new());
    let (sink, outbox) = NotificationSink::channel();
    let router = Arc::new(CommandRouter::new(
        &config.server,
        scheduler.clone(),
        Arc::new(ExprEvaluator),
    ));

    let shutdown = CancellationToken::new();
    let ticker = tokio::spawn(scheduler.clone().run(sink.clone(), shutdown.clone()));

    let server = &config.server;
    info!("Connecting to {}:{} as {}", server.address, server.port, server.nickname);

    let session = Session::new(router, sink).with_max_line_length(config.max_line_length);
    let result = match connect(&server.address, server.port).await {
        Ok(stream) => {
            session
                .run_tcp(stream, &server.address, outbox, shutdown.clone())
                .await
        }
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        report(e);
    }

    shutdown.cancel();
    if let Err(e) = ticker.await {
        error!("Reminder ticker stopped abnormally: {e}");
    }
    scheduler.shutdown();

    info!("dingbot stopped");
    Ok(())
}
