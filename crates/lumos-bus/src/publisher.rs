//! Publisher side of the bus
//!
//! A [`Publisher`] listens on a TCP address. Every accepted connection becomes
//! a subscriber that receives each message published afterwards as a
//! length-prefixed frame.

use crate::error::{BusError, Result};
use crate::messages::{Event, Message};
use crate::serialization::{Codec, FramedCodec};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// Publisher configuration
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Listen address
    pub listen_address: String,
    /// Messages buffered per subscriber before it lags
    pub broadcast_buffer_size: usize,
    /// Maximum connected subscribers
    pub max_subscribers: usize,
    /// Wire codec
    pub codec: Codec,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1:7878".to_string(),
            broadcast_buffer_size: 64,
            max_subscribers: 64,
            codec: Codec::Json,
        }
    }
}

/// Broadcasts events to every connected subscriber
pub struct Publisher {
    local_addr: SocketAddr,
    sender: broadcast::Sender<Message>,
    sequence: AtomicU64,
    subscribers: Arc<AtomicUsize>,
    shutdown: watch::Sender<bool>,
    accept_task: Option<JoinHandle<()>>,
}

impl Publisher {
    /// Bind the listen address and start accepting subscribers
    pub async fn bind(config: PublisherConfig) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_address).await?;
        let local_addr = listener.local_addr()?;
        let (sender, _) = broadcast::channel(config.broadcast_buffer_size.max(1));
        let (shutdown, _) = watch::channel(false);
        let subscribers = Arc::new(AtomicUsize::new(0));

        let acceptor = Acceptor {
            listener,
            sender: sender.clone(),
            subscribers: subscribers.clone(),
            max_subscribers: config.max_subscribers,
            codec: FramedCodec::new(config.codec),
            shutdown: shutdown.subscribe(),
            connections: JoinSet::new(),
        };
        let accept_task = tokio::spawn(acceptor.run());

        info!("Publishing on {}", local_addr);

        Ok(Self {
            local_addr,
            sender,
            sequence: AtomicU64::new(0),
            subscribers,
            shutdown,
            accept_task: Some(accept_task),
        })
    }

    /// Address the publisher is listening on
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of connected remote subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed)
    }

    /// Publish an event to all current subscribers. Returns its sequence number.
    pub fn publish(&self, event: impl Into<Event>) -> u64 {
        let message = Message::new(self.next_sequence(), event.into());
        let sequence = message.sequence;
        let topic = message.topic();

        match self.sender.send(message) {
            Ok(count) => debug!("Published {} #{} to {} receivers", topic, sequence, count),
            // No receivers is not an error
            Err(_) => debug!("Published {} #{} without receivers", topic, sequence),
        }
        sequence
    }

    /// Receive published messages in-process
    pub fn subscribe_local(&self) -> broadcast::Receiver<Message> {
        self.sender.subscribe()
    }

    /// Wait until at least `count` remote subscribers are connected.
    ///
    /// Returns false if `timeout` elapses first.
    pub async fn wait_for_subscribers(&self, count: usize, timeout: Duration) -> bool {
        let wait = async {
            while self.subscriber_count() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }

    /// Stop accepting and disconnect all subscribers once they received
    /// everything published so far
    pub async fn shutdown(&mut self) {
        self.shutdown.send_replace(true);
        if let Some(task) = self.accept_task.take() {
            let _ = task.await;
        }
        info!("Publisher on {} shut down", self.local_addr);
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

struct Acceptor {
    listener: TcpListener,
    sender: broadcast::Sender<Message>,
    subscribers: Arc<AtomicUsize>,
    max_subscribers: usize,
    codec: FramedCodec,
    shutdown: watch::Receiver<bool>,
    connections: JoinSet<()>,
}

impl Acceptor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                _ = self.shutdown.changed() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.admit(stream, peer),
                    Err(e) => warn!("Failed to accept subscriber: {}", e),
                },
                Some(_) = self.connections.join_next(), if !self.connections.is_empty() => {}
            }
        }

        // Connections flush what is already queued before closing
        while self.connections.join_next().await.is_some() {}
    }

    fn admit(&mut self, stream: TcpStream, peer: SocketAddr) {
        // Subscribe before counting so a waiting publisher never misses a message
        let receiver = self.sender.subscribe();

        if let Err(e) = reserve_slot(&self.subscribers, self.max_subscribers) {
            warn!("Rejecting subscriber {}: {}", peer, e);
            return;
        }

        info!("Subscriber connected: {}", peer);
        let connection = Connection {
            stream,
            peer,
            receiver,
            codec: self.codec,
            shutdown: self.shutdown.clone(),
            subscribers: self.subscribers.clone(),
        };
        self.connections.spawn(connection.run());
    }
}

fn reserve_slot(count: &AtomicUsize, max: usize) -> Result<()> {
    count
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
            (n < max).then_some(n + 1)
        })
        .map(|_| ())
        .map_err(|_| BusError::MaxSubscribers(max))
}

struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    receiver: broadcast::Receiver<Message>,
    codec: FramedCodec,
    shutdown: watch::Receiver<bool>,
    subscribers: Arc<AtomicUsize>,
}

impl Connection {
    async fn run(mut self) {
        let (mut reader, mut writer) = self.stream.into_split();
        // Subscribers never send; a read only completes on disconnect
        let mut probe = [0u8; 64];

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    while let Ok(message) = self.receiver.try_recv() {
                        if write_frame(&self.codec, &mut writer, &message).await.is_err() {
                            break;
                        }
                    }
                    break;
                }
                read = reader.read(&mut probe) => match read {
                    Ok(0) | Err(_) => break,
                    Ok(_) => continue,
                },
                received = self.receiver.recv() => match received {
                    Ok(message) => {
                        if let Err(e) = write_frame(&self.codec, &mut writer, &message).await {
                            debug!("Write to {} failed: {}", self.peer, e);
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Subscriber {} lagged, skipped {} messages", self.peer, skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        self.subscribers.fetch_sub(1, Ordering::SeqCst);
        info!("Subscriber disconnected: {}", self.peer);
    }
}

async fn write_frame(
    codec: &FramedCodec,
    writer: &mut OwnedWriteHalf,
    message: &Message,
) -> Result<()> {
    match codec.encode_framed(message) {
        Ok(frame) => writer.write_all(&frame).await?,
        Err(e) => warn!("Dropping message #{}: {}", message.sequence, e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscriber::{Subscriber, SubscriberConfig};
    use lumos_core::{Progress, SelectedIds, Topic};

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn local_publisher(max_subscribers: usize) -> Publisher {
        let config = PublisherConfig {
            listen_address: "127.0.0.1:0".to_string(),
            max_subscribers,
            ..Default::default()
        };
        Publisher::bind(config).await.unwrap()
    }

    async fn connect(publisher: &Publisher, topics: &[&str]) -> Subscriber {
        let config = SubscriberConfig {
            address: publisher.local_addr().to_string(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        };
        Subscriber::connect(config).await.unwrap()
    }

    #[test]
    fn test_publisher_config_default() {
        let config = PublisherConfig::default();
        assert_eq!(config.listen_address, "127.0.0.1:7878");
        assert_eq!(config.broadcast_buffer_size, 64);
        assert_eq!(config.max_subscribers, 64);
        assert_eq!(config.codec, Codec::Json);
    }

    #[test]
    fn test_reserve_slot() {
        let count = AtomicUsize::new(1);
        assert!(reserve_slot(&count, 2).is_ok());
        assert!(matches!(
            reserve_slot(&count, 2),
            Err(BusError::MaxSubscribers(2))
        ));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_local_subscription() {
        let publisher = local_publisher(4).await;
        let mut receiver = publisher.subscribe_local();

        assert_eq!(publisher.publish(Progress::new("first", 2)), 0);
        assert_eq!(publisher.publish(SelectedIds::from(vec![7])), 1);

        let first = receiver.recv().await.unwrap();
        let second = receiver.recv().await.unwrap();
        assert_eq!(first.sequence, 0);
        assert_eq!(first.topic(), Progress::TYPE_NAME);
        assert_eq!(second.event, Event::SelectedIds(SelectedIds::from(vec![7])));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let publisher = local_publisher(4).await;
        assert_eq!(publisher.publish(Progress::new("nobody listens", 1)), 0);
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_remote_subscription() {
        let publisher = local_publisher(4).await;
        let mut subscriber = connect(&publisher, &[]).await;
        assert!(publisher.wait_for_subscribers(1, TIMEOUT).await);

        publisher.publish(SelectedIds::from(vec![1, 2, 3]));

        let message = subscriber.receive_timeout(TIMEOUT).await.unwrap().unwrap();
        assert_eq!(message.sequence, 0);
        assert_eq!(message.event, Event::SelectedIds(SelectedIds::from(vec![1, 2, 3])));
    }

    #[tokio::test]
    async fn test_topic_filter() {
        let publisher = local_publisher(4).await;
        let mut subscriber = connect(&publisher, &[Progress::TYPE_NAME]).await;
        assert!(publisher.wait_for_subscribers(1, TIMEOUT).await);

        publisher.publish(SelectedIds::from(vec![1]));
        publisher.publish(Progress::new("meshing", 4));

        let message = subscriber.receive_timeout(TIMEOUT).await.unwrap().unwrap();
        assert_eq!(message.sequence, 1);
        assert_eq!(message.topic(), Progress::TYPE_NAME);
    }

    #[tokio::test]
    async fn test_max_subscribers() {
        let publisher = local_publisher(1).await;
        let _accepted = connect(&publisher, &[]).await;
        assert!(publisher.wait_for_subscribers(1, TIMEOUT).await);

        // The connection is accepted by the OS, then dropped by the publisher
        let mut rejected = connect(&publisher, &[]).await;
        let received = tokio::time::timeout(TIMEOUT, rejected.receive())
            .await
            .unwrap()
            .unwrap();
        assert!(received.is_none());
        assert_eq!(publisher.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_subscriber_disconnect() {
        let publisher = local_publisher(4).await;
        let subscriber = connect(&publisher, &[]).await;
        assert!(publisher.wait_for_subscribers(1, TIMEOUT).await);

        drop(subscriber);

        let drained = tokio::time::timeout(TIMEOUT, async {
            while publisher.subscriber_count() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(drained.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_closes_subscribers() {
        let mut publisher = local_publisher(4).await;
        let mut subscriber = connect(&publisher, &[]).await;
        assert!(publisher.wait_for_subscribers(1, TIMEOUT).await);

        publisher.shutdown().await;

        let received = tokio::time::timeout(TIMEOUT, subscriber.receive())
            .await
            .unwrap()
            .unwrap();
        assert!(received.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_delivers_published_messages() {
        let mut publisher = local_publisher(4).await;
        let mut subscriber = connect(&publisher, &[]).await;
        assert!(publisher.wait_for_subscribers(1, TIMEOUT).await);

        for i in 0..3 {
            publisher.publish(SelectedIds::from(vec![i]));
        }
        publisher.shutdown().await;

        for expected in 0..3 {
            let message = subscriber.receive().await.unwrap().unwrap();
            assert_eq!(message.sequence, expected);
        }
        assert!(subscriber.receive().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wait_for_subscribers_times_out() {
        let publisher = local_publisher(4).await;
        assert!(
            !publisher
                .wait_for_subscribers(1, Duration::from_millis(50))
                .await
        );
    }
}
