use super::config::AiakosConfig;
use super::open_gate;

/// Show ledger status
///
/// Displays:
/// - Ledger file location
/// - Owner identity
/// - Quorum threshold
/// - Registered maintainers
/// - Known releases and their approval state
pub async fn execute(config: &AiakosConfig) -> Result<(), Box<dyn std::error::Error>> {
    let gate = open_gate(config).await?;
    let required = gate.required_approvals().await;
    let maintainers = gate.maintainers().await;
    let releases = gate.releases().await;

    println!("📊 Aiakos Ledger Status");
    println!();
    println!("  Ledger: {}", config.ledger.state_path.display());
    println!("  Owner: {}", gate.owner().await);
    println!("  Required approvals: {}", required);
    println!();

    println!("  Maintainers ({}):", maintainers.len());
    for maintainer in &maintainers {
        println!("    {}", maintainer);
    }
    println!();

    let approved = releases.iter().filter(|r| r.approved).count();
    println!("  Releases ({} approved / {} known):", approved, releases.len());
    for info in &releases {
        println!(
            "    {:<16} {:<17} {}/{}",
            info.version,
            info.status().to_string(),
            info.approvals,
            required
        );
    }

    Ok(())
}
