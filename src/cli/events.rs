use super::config::AiakosConfig;
use super::open_gate;
use aiakos::identity::Identity;
use aiakos::ledger::events::format_events;
use aiakos::ledger::{EventKind, EventQuery};

/// List ledger events, most recent first
pub async fn execute(
    config: &AiakosConfig,
    kind: Option<EventKind>,
    maintainer: Option<Identity>,
    version: Option<String>,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let gate = open_gate(config).await?;
    let query = EventQuery {
        kind,
        maintainer,
        version,
        after_sequence: None,
        limit: Some(limit),
    };

    let records = gate.query_events(&query).await;
    println!("{}", format_events(&records));
    Ok(())
}
