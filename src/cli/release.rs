//! Release commands: deploy-release, release-info, check-release.

use super::config::AiakosConfig;
use super::open_gate;
use aiakos::identity::Identity;
use aiakos::ledger::{ContentHash, LedgerEvent, ReleaseInfo};

/// Record the caller's approval of a release
pub async fn deploy(
    config: &AiakosConfig,
    caller: Identity,
    version: &str,
    hash: ContentHash,
) -> Result<(), Box<dyn std::error::Error>> {
    let gate = open_gate(config).await?;
    let events = gate.deploy_release(&caller, version, hash).await?;

    if events.is_empty() {
        println!("Approval already recorded for {} by {}", version, caller);
        return Ok(());
    }

    for event in &events {
        match event {
            LedgerEvent::ApprovalGranted { .. } => {
                println!("✅ Approval granted: {} ({})", version, hash)
            }
            LedgerEvent::ReleaseApproved { .. } => println!("🎉 Release approved: {}", version),
            LedgerEvent::MaintainerAdded { .. } => {}
        }
    }

    let info = gate.get_release_info(version).await;
    println!(
        "   Approvals: {}/{}",
        info.approvals,
        gate.required_approvals().await
    );
    Ok(())
}

/// Render release info as text
pub fn format_info(info: &ReleaseInfo, required_approvals: u32) -> String {
    if !info.exists {
        return format!("Release {}: unknown (no approvals submitted)", info.version);
    }

    format!(
        "Release {}\n  Hash: {}\n  Status: {}\n  Approvals: {}/{}",
        info.version,
        info.hash,
        info.status(),
        info.approvals,
        required_approvals
    )
}

/// Show the recorded state of a release
pub async fn info(
    config: &AiakosConfig,
    version: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let gate = open_gate(config).await?;
    let info = gate.get_release_info(version).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", format_info(&info, gate.required_approvals().await));
    }
    Ok(())
}

/// Verify a candidate hash; errors unless the release is approved with it
pub async fn check(
    config: &AiakosConfig,
    version: &str,
    hash: ContentHash,
) -> Result<(), Box<dyn std::error::Error>> {
    let gate = open_gate(config).await?;

    if gate.check_release(version, &hash).await? {
        println!("✅ Release {} is approved with hash {}", version, hash);
        Ok(())
    } else {
        Err(format!("Release {} is not approved", version).into())
    }
}
