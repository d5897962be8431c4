use super::config::AiakosConfig;
use aiakos::identity::Identity;
use aiakos::ledger::{FileStore, ReleaseGate};

/// Create the ledger
///
/// The caller becomes the owner: the only identity that may register
/// maintainers. Both the owner and `required_approvals` are fixed for the
/// lifetime of the ledger; there is no command to change them afterwards.
pub async fn execute(
    config: &AiakosConfig,
    caller: Identity,
    required_approvals: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::new(&config.ledger.state_path);
    ReleaseGate::create(store, caller, required_approvals).await?;

    println!("✅ Ledger created: {}", config.ledger.state_path.display());
    println!("   Owner: {}", caller);
    println!("   Required approvals: {}", required_approvals);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> AiakosConfig {
        AiakosConfig::new(dir.path().join("ledger.cbor"))
    }

    #[tokio::test]
    async fn test_init_creates_ledger() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        execute(&config, Identity::new([0; 32]), 2).await.unwrap();
        assert!(config.ledger.state_path.exists());
    }

    #[tokio::test]
    async fn test_init_twice_fails() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        execute(&config, Identity::new([0; 32]), 2).await.unwrap();
        let err = execute(&config, Identity::new([1; 32]), 3)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already initialized"));
    }

    #[tokio::test]
    async fn test_init_zero_quorum_fails() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        assert!(execute(&config, Identity::new([0; 32]), 0).await.is_err());
        assert!(!config.ledger.state_path.exists());
    }
}
