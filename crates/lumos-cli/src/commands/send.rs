//! Send command: publish the events of a script

use crate::commands::script::{ScriptEvent, parse_script};
use lumos_bus::{Publisher, PublisherConfig};
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// How long to wait for the requested number of subscribers
const SUBSCRIBER_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn run(
    script: Option<&Path>,
    address: &str,
    wait_for: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = match script {
        Some(path) => {
            info!("Reading script from {}", path.display());
            std::fs::read_to_string(path)?
        }
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        }
    };

    let events = parse_script(&input)?;
    info!("Parsed {} events", events.len());

    let mut publisher = Publisher::bind(PublisherConfig {
        listen_address: address.to_string(),
        ..Default::default()
    })
    .await?;

    if wait_for > 0 {
        info!("Waiting for {} subscribers", wait_for);
        if !publisher
            .wait_for_subscribers(wait_for, SUBSCRIBER_TIMEOUT)
            .await
        {
            warn!(
                "Only {} of {} subscribers connected, sending anyway",
                publisher.subscriber_count(),
                wait_for
            );
        }
    }

    publish_all(&publisher, events).await;
    publisher.shutdown().await;

    Ok(())
}

/// Publish each event after its pause
pub async fn publish_all(publisher: &Publisher, events: Vec<ScriptEvent>) {
    for ScriptEvent { pause, event } in events {
        if !pause.is_zero() {
            info!("Sleeping for {} seconds", pause.as_secs_f32());
            tokio::time::sleep(pause).await;
        }

        info!("Sending event {}", event.type_name());
        publisher.publish(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumos_bus::Event;
    use lumos_core::SelectedIds;

    #[tokio::test]
    async fn test_publish_all_in_order() {
        let publisher = Publisher::bind(PublisherConfig {
            listen_address: "127.0.0.1:0".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
        let mut receiver = publisher.subscribe_local();

        let events = parse_script(
            "lumos::data::SelectedIds\n1\nlumos::data::SelectedIds 0.01\n2\n",
        )
        .unwrap();
        publish_all(&publisher, events).await;

        let first = receiver.recv().await.unwrap();
        let second = receiver.recv().await.unwrap();
        assert_eq!(first.event, Event::SelectedIds(SelectedIds::from(vec![1])));
        assert_eq!(second.event, Event::SelectedIds(SelectedIds::from(vec![2])));
        assert!(second.sequence > first.sequence);
    }
}
