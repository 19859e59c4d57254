//! Subscriber side of the bus

use crate::error::{BusError, Result};
use crate::messages::Message;
use crate::serialization::{Codec, FramedCodec};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Publisher address
    pub address: String,
    /// Topics to deliver; empty delivers everything
    pub topics: Vec<String>,
    /// Wire codec
    pub codec: Codec,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:7878".to_string(),
            topics: Vec::new(),
            codec: Codec::Json,
        }
    }
}

/// Receives messages from a [`Publisher`](crate::Publisher)
pub struct Subscriber {
    config: SubscriberConfig,
    stream: TcpStream,
    codec: FramedCodec,
    buffer: Vec<u8>,
    closed: bool,
}

impl Subscriber {
    /// Connect to a publisher
    pub async fn connect(config: SubscriberConfig) -> Result<Self> {
        let stream = TcpStream::connect(&config.address).await?;
        info!("Subscribed to {}", config.address);

        Ok(Self {
            codec: FramedCodec::new(config.codec),
            config,
            stream,
            buffer: Vec::new(),
            closed: false,
        })
    }

    /// Topics this subscriber delivers
    pub fn topics(&self) -> &[String] {
        &self.config.topics
    }

    fn wants(&self, message: &Message) -> bool {
        let topics = self.topics();
        topics.is_empty() || topics.iter().any(|t| t == message.topic())
    }

    /// Wait for the next message on a subscribed topic.
    ///
    /// Returns `None` once the publisher closes the connection.
    pub async fn receive(&mut self) -> Result<Option<Message>> {
        let mut chunk = [0u8; 4096];

        loop {
            while let Some((message, consumed)) =
                self.codec.decode_framed::<Message>(&self.buffer)?
            {
                self.buffer.drain(..consumed);
                if self.wants(&message) {
                    return Ok(Some(message));
                }
                debug!("Skipping {} #{}", message.topic(), message.sequence);
            }

            if self.closed {
                return Ok(None);
            }

            let read = self.stream.read(&mut chunk).await?;
            if read == 0 {
                self.closed = true;
                if !self.buffer.is_empty() {
                    // Publisher went away in the middle of a frame
                    return Err(BusError::Closed);
                }
                info!("Publisher {} closed the connection", self.config.address);
                return Ok(None);
            }
            self.buffer.extend_from_slice(&chunk[..read]);
        }
    }

    /// Like [`Subscriber::receive`], but returns `None` when nothing arrives
    /// within `timeout`. A closed connection is reported as
    /// [`BusError::Closed`].
    pub async fn receive_timeout(&mut self, timeout: Duration) -> Result<Option<Message>> {
        match tokio::time::timeout(timeout, self.receive()).await {
            Ok(Ok(Some(message))) => Ok(Some(message)),
            Ok(Ok(None)) => Err(BusError::Closed),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(None),
        }
    }

    /// Whether the publisher closed the connection
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
