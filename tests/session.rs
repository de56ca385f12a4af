use std::sync::Arc;
use std::time::Duration;

use dingbot::commands::CommandRouter;
use dingbot::core::{ChannelConfig, ServerConfig};
use dingbot::features::calc::ExprEvaluator;
use dingbot::features::reminders::ReminderScheduler;
use dingbot::irc::{connect, ConnectionError, NotificationSink, Session};
use pretty_assertions::assert_eq;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

fn server_config(port: u16) -> ServerConfig {
    ServerConfig {
        address: "127.0.0.1".into(),
        port,
        nickname: "dingbot".into(),
        password: "hunter2".into(),
        channels: vec![ChannelConfig {
            channel: "#rust".into(),
            password: None,
        }],
    }
}

async fn next_line<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> String {
    let mut line = String::new();
    tokio::time::timeout(Duration::from_secs(5), reader.read_line(&mut line))
        .await
        .expect("timed out waiting for a line")
        .expect("read failed");
    line.trim_end_matches("\r\n").to_string()
}

#[tokio::test]
async fn test_full_session_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = server_config(port);

    let scheduler = Arc::new(ReminderScheduler::new());
    let (sink, outbox) = NotificationSink::channel();
    let router = Arc::new(CommandRouter::new(
        &config,
        scheduler.clone(),
        Arc::new(ExprEvaluator),
    ));
    let shutdown = CancellationToken::new();
    let ticker = tokio::spawn(scheduler.clone().run(sink.clone(), shutdown.clone()));

    let bot = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let stream = connect("127.0.0.1", port).await?;
            Session::new(router, sink)
                .run_tcp(stream, "127.0.0.1", outbox, shutdown)
                .await
        })
    };

    let (socket, _) = listener.accept().await.unwrap();
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    assert_eq!(next_line(&mut reader).await, "NICK dingbot");
    assert_eq!(
        next_line(&mut reader).await,
        "USER dingbot dingbot 127.0.0.1 :dingbot"
    );

    write_half
        .write_all(
            b":NickServ!NickServ@services. NOTICE dingbot :This nickname is registered, \
              please choose a different nick\r\n",
        )
        .await
        .unwrap();
    assert_eq!(next_line(&mut reader).await, "MODE dingbot +B");
    assert_eq!(
        next_line(&mut reader).await,
        "PRIVMSG NickServ :IDENTIFY hunter2"
    );
    assert_eq!(next_line(&mut reader).await, "JOIN #rust");

    // Two lines in one write, the second split over a later write
    write_half
        .write_all(b"PING :tick\r\n:alice!a@example.org PRIVMSG #rust :.t 1s st")
        .await
        .unwrap();
    assert_eq!(next_line(&mut reader).await, "PONG :tick");
    write_half.write_all(b"retch\r\n").await.unwrap();

    let added = next_line(&mut reader).await;
    assert!(
        added.starts_with("PRIVMSG #rust :[timer added] stretch (expires the "),
        "unexpected reply: {added}"
    );
    assert_eq!(scheduler.len(), 1);

    assert_eq!(
        next_line(&mut reader).await,
        "PRIVMSG #rust :alice: ding! stretch"
    );
    assert!(scheduler.is_empty());

    drop(write_half);
    drop(reader);
    let result = bot.await.unwrap();
    assert!(matches!(result, Err(ConnectionError::RemoteClosed)));

    shutdown.cancel();
    ticker.await.unwrap();
}
