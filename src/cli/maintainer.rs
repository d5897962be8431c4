//! Maintainer registry commands: add, is-maintainer, am-i-maintainer.

use super::config::AiakosConfig;
use super::open_gate;
use aiakos::identity::Identity;

/// Register a maintainer (owner only)
pub async fn add(
    config: &AiakosConfig,
    caller: Identity,
    maintainer: Identity,
) -> Result<(), Box<dyn std::error::Error>> {
    let gate = open_gate(config).await?;
    let events = gate.add_maintainer(&caller, maintainer).await?;

    if events.is_empty() {
        println!("Already a maintainer: {}", maintainer);
    } else {
        println!("✅ Maintainer added: {}", maintainer);
    }
    Ok(())
}

/// Membership query for any identity
pub async fn is_maintainer(
    config: &AiakosConfig,
    identity: Identity,
) -> Result<(), Box<dyn std::error::Error>> {
    let gate = open_gate(config).await?;
    println!("{}", gate.is_maintainer(&identity).await);
    Ok(())
}

/// Membership query for the caller itself
pub async fn am_i_maintainer(
    config: &AiakosConfig,
    caller: Identity,
) -> Result<(), Box<dyn std::error::Error>> {
    let gate = open_gate(config).await?;
    println!("{}", gate.am_i_maintainer(&caller).await);
    Ok(())
}
