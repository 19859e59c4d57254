//! Monitor command: live view of progress events

use lumos_bus::{BusError, Event, Subscriber, SubscriberConfig};
use lumos_core::{Progress, Topic};
use std::collections::BTreeMap;
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Monitor configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Publisher address
    pub address: String,
    /// Operations without updates for this long are dropped
    pub max_age: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:7878".to_string(),
            max_age: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Operation {
    amount: f32,
    updated: Instant,
}

/// Latest progress per operation
#[derive(Debug)]
pub struct ProgressMonitor {
    max_age: Duration,
    operations: BTreeMap<String, Operation>,
}

impl ProgressMonitor {
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            operations: BTreeMap::new(),
        }
    }

    /// Record a progress report received at `now`
    pub fn update(&mut self, progress: &Progress, now: Instant) {
        self.operations.insert(
            progress.operation.clone(),
            Operation {
                amount: progress.amount,
                updated: now,
            },
        );
    }

    /// Drop finished operations and those not updated within the maximum age
    pub fn prune(&mut self, now: Instant) {
        let max_age = self.max_age;
        self.operations.retain(|_, op| {
            op.amount < 1.0 && now.saturating_duration_since(op.updated) <= max_age
        });
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// How long to wait for the next report: forever while idle
    pub fn wait_timeout(&self) -> Option<Duration> {
        (!self.is_empty()).then_some(self.max_age)
    }

    /// Terminal output for the current state.
    ///
    /// A single operation is redrawn in place; several are listed one per line.
    pub fn render(&self) -> Option<String> {
        match self.operations.len() {
            0 => None,
            1 => self
                .operations
                .iter()
                .next()
                .map(|(name, op)| format!("\r{}: {}% ", name, percent(op.amount))),
            _ => {
                let mut out = String::from("\n");
                for (name, op) in &self.operations {
                    out.push_str(&format!("{}: {}%\n", name, percent(op.amount)));
                }
                Some(out)
            }
        }
    }
}

fn percent(amount: f32) -> i32 {
    (amount * 100.0) as i32
}

pub async fn run(config: MonitorConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Monitoring progress on {}", config.address);

    let mut subscriber = Subscriber::connect(SubscriberConfig {
        address: config.address.clone(),
        topics: vec![Progress::TYPE_NAME.to_string()],
        ..Default::default()
    })
    .await?;

    let mut monitor = ProgressMonitor::new(config.max_age);
    let mut stdout = std::io::stdout();

    loop {
        let received = match monitor.wait_timeout() {
            None => match subscriber.receive().await? {
                Some(message) => Some(message),
                None => break,
            },
            Some(timeout) => match subscriber.receive_timeout(timeout).await {
                Ok(message) => message,
                Err(BusError::Closed) => break,
                Err(e) => return Err(e.into()),
            },
        };

        if let Some(message) = received {
            if let Event::Progress(progress) = &message.event {
                debug!("{} at {}", progress.operation, progress.amount);
                monitor.update(progress, Instant::now());
            }
        }

        monitor.prune(Instant::now());
        debug!("{} active operations", monitor.len());
        if let Some(output) = monitor.render() {
            write!(stdout, "{}", output)?;
            stdout.flush()?;
        }
    }

    println!();
    info!("Publisher closed the connection");
    Ok(())
}
