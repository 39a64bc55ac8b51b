//! A mock SMTP server for the integration tests.
//!
//! It speaks just enough SMTP for `lettre` to deliver a message,
//! records every command line it receives
//! and hands each delivered message to the test over a channel.

#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::mpsc,
};

use smtp_test_tool::EmailRequest;

const TIMEOUT: Duration = Duration::from_millis(1000);

/// The authentication policy of the server.
#[derive(Clone, Debug)]
pub enum Auth {
    /// Require clients to login with the provided credentials.
    Login { username: String, password: String },
    /// Accept any client, with or without credentials.
    AcceptAll,
}

/// A message as delivered to the server.
#[derive(Debug)]
pub struct Received {
    pub address_from: String,
    pub addresses_to: Vec<String>,
    /// The username the client logged in with.
    pub username: Option<String>,
    pub data: Vec<u8>,
}

impl Received {
    pub fn parse(&self) -> mailparse::ParsedMail<'_> {
        mailparse::parse_mail(&self.data).expect("invalid message")
    }

    pub fn header(&self, name: &str) -> Option<String> {
        use mailparse::MailHeaderMap;
        self.parse().headers.get_first_value(name)
    }
}

pub struct Server {
    address: SocketAddr,
    commands: Arc<Mutex<Vec<String>>>,
    channel_rx: mpsc::UnboundedReceiver<Received>,
}

impl Server {
    /// Start a new server on a free local port.
    pub async fn start(auth: Auth) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let commands = Arc::new(Mutex::new(Vec::new()));
        let (channel_tx, channel_rx) = mpsc::unbounded_channel();
        tokio::spawn(accept(listener, auth, commands.clone(), channel_tx));
        Self {
            address,
            commands,
            channel_rx,
        }
    }

    /// A request with every default, pointed at this server.
    pub fn request(&self) -> EmailRequest {
        EmailRequest {
            host: self.address.ip().to_string(),
            port: self.address.port(),
            ..Default::default()
        }
    }

    pub fn port(&self) -> u16 {
        self.address.port()
    }

    /// Every command line received so far, without the line ending.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Wait for the next delivered message.
    pub async fn receive(&mut self) -> Received {
        tokio::time::timeout(TIMEOUT, self.channel_rx.recv())
            .await
            .expect("timeout receiving email")
            .expect("server stopped")
    }

    /// Every message delivered so far.
    pub fn received(&mut self) -> Vec<Received> {
        let mut received = Vec::new();
        while let Ok(email) = self.channel_rx.try_recv() {
            received.push(email);
        }
        received
    }
}

async fn accept(
    listener: TcpListener,
    auth: Auth,
    commands: Arc<Mutex<Vec<String>>>,
    channel: mpsc::UnboundedSender<Received>,
) {
    while let Ok((socket, _)) = listener.accept().await {
        tokio::spawn(session(
            socket,
            auth.clone(),
            commands.clone(),
            channel.clone(),
        ));
    }
}

/// Serve a single connection.
async fn session(
    socket: TcpStream,
    auth: Auth,
    commands: Arc<Mutex<Vec<String>>>,
    channel: mpsc::UnboundedSender<Received>,
) -> std::io::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let mut username = None;
    let mut address_from = String::new();
    let mut addresses_to = Vec::new();

    writer.write_all(b"220 mock ESMTP ready\r\n").await?;
    loop {
        let Some(line) = read_line(&mut reader).await? else {
            return Ok(());
        };
        commands.lock().unwrap().push(line.clone());
        let upper = line.to_ascii_uppercase();

        if upper.starts_with("EHLO") {
            writer.write_all(b"250-mock\r\n250 AUTH PLAIN\r\n").await?;
        } else if upper.starts_with("HELO") {
            writer.write_all(b"250 mock\r\n").await?;
        } else if upper.starts_with("AUTH PLAIN") {
            let encoded = match line.get("AUTH PLAIN ".len()..) {
                Some(encoded) => encoded.to_string(),
                None => {
                    writer.write_all(b"334 \r\n").await?;
                    read_line(&mut reader).await?.unwrap_or_default()
                }
            };
            match check_plain(&auth, &encoded) {
                Some(name) => {
                    username = Some(name);
                    writer.write_all(b"235 Authentication successful\r\n").await?;
                }
                None => {
                    writer.write_all(b"535 Authentication failed\r\n").await?;
                }
            }
        } else if upper.starts_with("MAIL FROM:") {
            if matches!(auth, Auth::Login { .. }) && username.is_none() {
                writer.write_all(b"530 Authentication required\r\n").await?;
                continue;
            }
            address_from = angle_address(&line);
            addresses_to.clear();
            writer.write_all(b"250 Ok\r\n").await?;
        } else if upper.starts_with("RCPT TO:") {
            addresses_to.push(angle_address(&line));
            writer.write_all(b"250 Ok\r\n").await?;
        } else if upper == "DATA" {
            writer.write_all(b"354 Go ahead\r\n").await?;
            let data = read_data(&mut reader).await?;
            let _ = channel.send(Received {
                address_from: std::mem::take(&mut address_from),
                addresses_to: std::mem::take(&mut addresses_to),
                username: username.clone(),
                data,
            });
            writer.write_all(b"250 Ok\r\n").await?;
        } else if upper == "RSET" || upper == "NOOP" {
            writer.write_all(b"250 Ok\r\n").await?;
        } else if upper == "QUIT" {
            writer.write_all(b"221 Bye\r\n").await?;
            return Ok(());
        } else {
            writer.write_all(b"502 Command not implemented\r\n").await?;
        }
    }
}

/// Read up to a "\r\n", which is stripped.
///
/// Returns `None` once the client closed the connection.
async fn read_line(
    reader: &mut (impl tokio::io::AsyncBufRead + Unpin),
) -> std::io::Result<Option<String>> {
    let mut buffer = Vec::new();
    if reader.read_until(b'\n', &mut buffer).await? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(&buffer);
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Read the message after `DATA`, up to the lone ".".
async fn read_data(
    reader: &mut (impl tokio::io::AsyncBufRead + Unpin),
) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::new();
    loop {
        let mut line = Vec::new();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(data);
        }
        if line == b".\r\n" {
            return Ok(data);
        }
        let line = line.strip_prefix(b".").unwrap_or(&line);
        data.extend_from_slice(line);
    }
}

fn angle_address(line: &str) -> String {
    let start = line.find('<').map(|i| i + 1).unwrap_or(0);
    let end = line[start..]
        .find('>')
        .map(|i| start + i)
        .unwrap_or(line.len());
    line[start..end].to_string()
}

/// Check an `AUTH PLAIN` response, returning the username if accepted.
fn check_plain(auth: &Auth, encoded: &str) -> Option<String> {
    use base64ct::Encoding;
    let decoded = base64ct::Base64::decode_vec(encoded.trim()).ok()?;
    let mut fields = decoded.split(|byte| *byte == 0).skip(1);
    let name = String::from_utf8(fields.next()?.to_vec()).ok()?;
    let secret = String::from_utf8(fields.next()?.to_vec()).ok()?;
    match auth {
        Auth::Login { username, password }
            if *username != name || *password != secret =>
        {
            None
        }
        _ => Some(name),
    }
}

/// A local port nothing is listening on.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
