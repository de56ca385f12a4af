//! # Server Connection
//!
//! One TCP connection to the server: registration on connect, an inbound
//! read loop feeding the framer, parser and router, and a single writer
//! task draining the [`NotificationSink`].
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Queued lines flushed before the session returns
//! - 1.1.0: Connection failures classified for logging
//! - 1.0.0: Initial read loop with serialized writer

use futures::SinkExt;
use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::{lookup_host, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::FramedWrite;
use tokio_util::sync::CancellationToken;

use super::framer::{FramerError, LineCodec, LineFramer};
use super::message::parse;
use super::sink::NotificationSink;
use crate::commands::CommandRouter;

/// Read buffer size for the inbound socket
const READ_CHUNK: usize = 4096;

/// How long queued lines get to reach the socket once the session ends
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Why the connection could not be made or ended
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("the host {0} was not found, check the host name and port settings")]
    HostNotFound(String),
    #[error("the connection to {0} was refused, check the host name and port settings")]
    Refused(String),
    #[error("the remote host closed the connection")]
    RemoteClosed,
    #[error(transparent)]
    Framing(#[from] FramerError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ConnectionError {
    fn from_connect(target: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ConnectionError::Refused(target.to_string()),
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof => ConnectionError::RemoteClosed,
            _ => ConnectionError::Io(err),
        }
    }
}

/// Resolve `address` and connect to the first address that accepts.
pub async fn connect(address: &str, port: u16) -> Result<TcpStream, ConnectionError> {
    let target = format!("{address}:{port}");
    let addrs: Vec<SocketAddr> = match lookup_host((address, port)).await {
        Ok(addrs) => addrs.collect(),
        Err(e) => {
            debug!("Lookup of {target} failed: {e}");
            return Err(ConnectionError::HostNotFound(target));
        }
    };
    if addrs.is_empty() {
        return Err(ConnectionError::HostNotFound(target));
    }

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                info!("Connected to {target} ({addr})");
                return Ok(stream);
            }
            Err(e) => {
                debug!("Connecting to {addr} failed: {e}");
                last_err = Some(e);
            }
        }
    }

    Err(match last_err {
        Some(e) => ConnectionError::from_connect(&target, e),
        None => ConnectionError::HostNotFound(target),
    })
}

/// Drives one connection from registration until it closes.
pub struct Session {
    router: Arc<CommandRouter>,
    sink: NotificationSink,
    max_line_length: Option<usize>,
}

impl Session {
    pub fn new(router: Arc<CommandRouter>, sink: NotificationSink) -> Self {
        Session {
            router,
            sink,
            max_line_length: None,
        }
    }

    /// Cap unterminated inbound data at `max` bytes
    pub fn with_max_line_length(mut self, max: Option<usize>) -> Self {
        self.max_line_length = max;
        self
    }

    pub async fn run_tcp(
        &self,
        stream: TcpStream,
        peer: &str,
        outbox: mpsc::UnboundedReceiver<String>,
        shutdown: CancellationToken,
    ) -> Result<(), ConnectionError> {
        let (reader, writer) = stream.into_split();
        self.run(reader, writer, peer, outbox, shutdown).await
    }

    /// Register, then read until the peer closes, an error occurs or
    /// `shutdown` is cancelled. `outbox` is the receiving end of this
    /// session's sink and is drained by the writer task.
    pub async fn run<R, W>(
        &self,
        mut reader: R,
        writer: W,
        peer: &str,
        outbox: mpsc::UnboundedReceiver<String>,
        shutdown: CancellationToken,
    ) -> Result<(), ConnectionError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let stop_writer = CancellationToken::new();
        let mut writer_task = tokio::spawn(write_loop(writer, outbox, stop_writer.clone()));

        self.sink.send_all(self.router.registration(peer));

        let mut framer = match self.max_line_length {
            Some(max) => LineFramer::with_max_line_length(max),
            None => LineFramer::new(),
        };
        let mut chunk = vec![0u8; READ_CHUNK];

        let result = loop {
            let n = tokio::select! {
                _ = shutdown.cancelled() => break Ok(()),
                read = reader.read(&mut chunk) => match read {
                    Ok(n) => n,
                    Err(e) => break Err(ConnectionError::from_connect(peer, e)),
                },
            };
            if n == 0 {
                break Err(ConnectionError::RemoteClosed);
            }

            let lines = match framer.feed(&chunk[..n]) {
                Ok(lines) => lines,
                Err(e) => break Err(e.into()),
            };
            for line in lines {
                for reply in self.router.route(&parse(&line)) {
                    self.sink.send_raw(reply);
                }
            }
        };

        stop_writer.cancel();
        if tokio::time::timeout(FLUSH_TIMEOUT, &mut writer_task)
            .await
            .is_err()
        {
            warn!("Outbound lines not flushed after {FLUSH_TIMEOUT:?}, dropping them");
            writer_task.abort();
        }
        result
    }
}

/// Single writer: every outbound line goes through here, one at a time.
///
/// After `stop` is cancelled, lines already queued are still written.
async fn write_loop<W>(
    writer: W,
    mut outbox: mpsc::UnboundedReceiver<String>,
    stop: CancellationToken,
) where
    W: AsyncWrite + Unpin,
{
    let mut framed = FramedWrite::new(writer, LineCodec);
    loop {
        let line = tokio::select! {
            biased;
            line = outbox.recv() => match line {
                Some(line) => line,
                None => break,
            },
            _ = stop.cancelled() => break,
        };
        debug!(">> {line}");
        if let Err(e) = framed.send(line).await {
            error!("Write failed, stopping writer: {e}");
            break;
        }
    }
    if let Err(e) = framed.close().await {
        warn!("Closing writer failed: {e}");
    }
}

/// Log a connection failure the way an operator needs to see it
pub fn report(err: &ConnectionError) {
    match err {
        ConnectionError::RemoteClosed => info!("Disconnected from the server"),
        other => error!("{other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{ChannelConfig, ServerConfig};
    use crate::features::calc::ExprEvaluator;
    use crate::features::reminders::ReminderScheduler;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    fn router() -> Arc<CommandRouter> {
        let server = ServerConfig {
            address: "irc.example.org".into(),
            port: 6667,
            nickname: "dingbot".into(),
            password: "pw".into(),
            channels: vec![ChannelConfig {
                channel: "#rust".into(),
                password: None,
            }],
        };
        Arc::new(CommandRouter::new(
            &server,
            Arc::new(ReminderScheduler::new()),
            Arc::new(ExprEvaluator),
        ))
    }

    async fn next_line<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> String {
        let mut line = String::new();
        tokio::time::timeout(Duration::from_secs(5), reader.read_line(&mut line))
            .await
            .unwrap()
            .unwrap();
        line
    }

    #[tokio::test]
    async fn test_session_registers_and_answers() {
        let (bot_side, server_side) = tokio::io::duplex(4096);
        let (bot_read, bot_write) = tokio::io::split(bot_side);
        let (server_read, mut server_write) = tokio::io::split(server_side);
        let mut server_read = BufReader::new(server_read);

        let (sink, outbox) = NotificationSink::channel();
        let session = Session::new(router(), sink);
        let shutdown = CancellationToken::new();
        let task = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                session
                    .run(bot_read, bot_write, "irc.example.org", outbox, shutdown)
                    .await
            })
        };

        assert_eq!(next_line(&mut server_read).await, "NICK dingbot\r\n");
        assert_eq!(
            next_line(&mut server_read).await,
            "USER dingbot dingbot irc.example.org :dingbot\r\n"
        );

        // Probe split across two writes
        server_write.write_all(b"PING :serv").await.unwrap();
        server_write.write_all(b"er1\r\n").await.unwrap();
        assert_eq!(next_line(&mut server_read).await, "PONG :server1\r\n");

        server_write
            .write_all(b":alice!a@h PRIVMSG #rust :?6*7\r\n")
            .await
            .unwrap();
        assert_eq!(next_line(&mut server_read).await, "PRIVMSG #rust :alice: 42\r\n");

        shutdown.cancel();
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_session_reports_remote_close() {
        let (bot_side, server_side) = tokio::io::duplex(4096);
        let (bot_read, bot_write) = tokio::io::split(bot_side);

        let (sink, outbox) = NotificationSink::channel();
        let session = Session::new(router(), sink);
        drop(server_side);

        let result = session
            .run(bot_read, bot_write, "irc.example.org", outbox, CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ConnectionError::RemoteClosed)));
    }

    #[tokio::test]
    async fn test_session_rejects_oversized_line() {
        let (bot_side, server_side) = tokio::io::duplex(4096);
        let (bot_read, bot_write) = tokio::io::split(bot_side);
        let (_server_read, mut server_write) = tokio::io::split(server_side);

        let (sink, outbox) = NotificationSink::channel();
        let session = Session::new(router(), sink).with_max_line_length(Some(16));

        server_write.write_all(&[b'x'; 64]).await.unwrap();
        let result = session
            .run(bot_read, bot_write, "irc.example.org", outbox, CancellationToken::new())
            .await;
        assert!(matches!(
            result,
            Err(ConnectionError::Framing(FramerError::LineTooLong(16)))
        ));
    }

    #[tokio::test]
    async fn test_queued_lines_are_flushed_on_shutdown() {
        let (bot_side, server_side) = tokio::io::duplex(4096);
        let (bot_read, bot_write) = tokio::io::split(bot_side);
        let (server_read, _server_write) = tokio::io::split(server_side);
        let mut server_read = BufReader::new(server_read);

        let (sink, outbox) = NotificationSink::channel();
        let session = Session::new(router(), sink.clone());
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        assert!(sink.send_raw("PRIVMSG #rust :alice: 42"));
        let result = session
            .run(bot_read, bot_write, "irc.example.org", outbox, shutdown)
            .await;
        assert!(result.is_ok());

        assert_eq!(next_line(&mut server_read).await, "PRIVMSG #rust :alice: 42\r\n");
        assert_eq!(next_line(&mut server_read).await, "NICK dingbot\r\n");
        assert_eq!(
            next_line(&mut server_read).await,
            "USER dingbot dingbot irc.example.org :dingbot\r\n"
        );
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = connect("127.0.0.1", port).await.unwrap_err();
        assert!(matches!(err, ConnectionError::Refused(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_connect_unknown_host() {
        let err = connect("host.invalid", 6667).await.unwrap_err();
        assert!(matches!(err, ConnectionError::HostNotFound(_)), "got {err:?}");
    }
}
