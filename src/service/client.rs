//! # Message Sender
//!
//! Client side of the protocol: connects to a receiver and sends text
//! messages, files, and the `quit` sentinel.
//!
//! File content is streamed in the same 2048-byte blocks the receiver
//! reads, after an attribute block declaring the file name and raw byte
//! count.

use std::io;
use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::info;

use crate::core::message::{Attribute, Message};
use crate::core::receiver::BLOCK_SIZE;
use crate::error::Result;
use crate::transport::Transport;

/// One-way sender over a single connection.
pub struct MessageSender {
    transport: Transport<TcpStream>,
}

impl MessageSender {
    /// Connect to a receiver.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self {
            transport: Transport::new(stream),
        })
    }

    /// Send a pre-built message verbatim.
    pub async fn send_message(&mut self, message: &Message) -> Result<()> {
        self.transport.write_all(&message.to_wire_bytes()).await?;
        self.transport.flush().await
    }

    /// Send a POST carrying `body` inline.
    pub async fn post_text(&mut self, body: &str) -> Result<()> {
        let mut message = Message::new();
        message.add_attribute(Attribute::new("POST", "Message"));
        message.add_attribute(Attribute::new("content-length", body.len().to_string()));
        message.set_body(body.as_bytes().to_vec());
        self.send_message(&message).await
    }

    /// Send a file: the announcing attribute block, then the raw content
    /// in 2048-byte blocks.
    pub async fn send_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;

        let mut file = File::open(path).await?;
        let size = file.metadata().await?.len();

        let mut announce = Message::new();
        announce.add_attribute(Attribute::new("POST", "Message"));
        announce.add_attribute(Attribute::new("file", &name));
        announce.add_attribute(Attribute::new("content-length", size.to_string()));
        self.transport.write_all(&announce.to_wire_bytes()).await?;

        let mut block = vec![0u8; BLOCK_SIZE];
        let mut sent = 0u64;
        while sent < size {
            let n = file.read(&mut block).await?;
            if n == 0 {
                // File shrank underneath us; the declared count can no
                // longer be honored.
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "file truncated while sending",
                )
                .into());
            }
            // Never send past the declared size if the file grew.
            let n = n.min((size - sent) as usize);
            self.transport.write_all(&block[..n]).await?;
            sent += n as u64;
        }
        self.transport.flush().await?;

        info!(file = %name, bytes = size, "file sent");
        Ok(())
    }

    /// Send the termination sentinel the receiver recognizes.
    pub async fn send_quit(&mut self) -> Result<()> {
        self.post_text("quit").await
    }
}
