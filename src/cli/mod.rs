use aiakos::identity::Identity;
use aiakos::ledger::{ContentHash, FileStore, ReleaseGate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod config;
pub mod digest;
pub mod events;
pub mod identity;
pub mod init;
pub mod logging;
pub mod maintainer;
pub mod release;
pub mod status;
pub mod version;

use config::{default_config_path, AiakosConfig};

#[derive(Parser)]
#[command(name = "aiakos")]
#[command(author = "Aiakos Project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-party release approval gate", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.local/share/aiakos/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the ledger; the caller becomes its owner
    Init {
        /// Identity of the deployer (becomes the owner)
        #[arg(long)]
        caller: Identity,

        /// Number of distinct maintainer approvals needed per release
        #[arg(long)]
        required_approvals: u32,
    },

    /// Register a maintainer (owner only)
    AddMaintainer {
        /// Identity invoking the operation
        #[arg(long)]
        caller: Identity,

        /// Identity to register
        #[arg(long)]
        maintainer: Identity,
    },

    /// Check whether an identity is a maintainer
    IsMaintainer {
        /// Identity to look up
        #[arg(long)]
        identity: Identity,
    },

    /// Check whether the caller is a maintainer
    AmIMaintainer {
        /// Identity invoking the operation
        #[arg(long)]
        caller: Identity,
    },

    /// Approve a release version with its content hash (maintainers only)
    DeployRelease {
        /// Identity invoking the operation
        #[arg(long)]
        caller: Identity,

        /// Release version (compared as an exact string)
        #[arg(long)]
        release_version: String,

        /// Content hash, 64 hex characters
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        hash: Option<ContentHash>,

        /// Compute the content hash from this file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show the recorded state of a release version
    ReleaseInfo {
        /// Release version
        #[arg(long)]
        release_version: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Verify a release; exits non-zero unless approved with a matching hash
    CheckRelease {
        /// Release version
        #[arg(long)]
        release_version: String,

        /// Candidate content hash, 64 hex characters
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        hash: Option<ContentHash>,

        /// Compute the candidate hash from this file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// List ledger events, most recent first
    Events {
        /// Only events of this kind (maintainer-added, approval-granted, release-approved)
        #[arg(long)]
        kind: Option<aiakos::ledger::EventKind>,

        /// Only events naming this maintainer
        #[arg(long)]
        maintainer: Option<Identity>,

        /// Only events naming this release version
        #[arg(long)]
        release_version: Option<String>,

        /// Maximum number of events to show
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Derive an identity from a label and the configured salt
    Identity {
        /// Human label, e.g. a maintainer's handle
        #[arg(long)]
        name: String,
    },

    /// Compute the content hash (SHA-256) of a file
    Digest {
        /// File to hash
        #[arg(long)]
        file: PathBuf,
    },

    /// Show owner, quorum, maintainers and releases
    Status,

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Version = cli.command {
        version::execute();
        return Ok(());
    }

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = AiakosConfig::load_or_create(&config_path)?;
    logging::init_logging(&config.logging)?;

    execute_with_config(&config, cli.command).await
}

async fn execute_with_config(
    config: &AiakosConfig,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Init {
            caller,
            required_approvals,
        } => init::execute(config, caller, required_approvals).await,
        Commands::AddMaintainer { caller, maintainer } => {
            maintainer::add(config, caller, maintainer).await
        }
        Commands::IsMaintainer { identity } => maintainer::is_maintainer(config, identity).await,
        Commands::AmIMaintainer { caller } => maintainer::am_i_maintainer(config, caller).await,
        Commands::DeployRelease {
            caller,
            release_version,
            hash,
            file,
        } => {
            let hash = resolve_hash(hash, file.as_deref())?;
            release::deploy(config, caller, &release_version, hash).await
        }
        Commands::ReleaseInfo {
            release_version,
            json,
        } => release::info(config, &release_version, json).await,
        Commands::CheckRelease {
            release_version,
            hash,
            file,
        } => {
            let hash = resolve_hash(hash, file.as_deref())?;
            release::check(config, &release_version, hash).await
        }
        Commands::Events {
            kind,
            maintainer,
            release_version,
            limit,
        } => events::execute(config, kind, maintainer, release_version, limit).await,
        Commands::Identity { name } => {
            identity::execute(config, &name);
            Ok(())
        }
        Commands::Digest { file } => digest::execute(&file),
        Commands::Status => status::execute(config).await,
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}

/// Open the gate over the configured ledger file.
pub async fn open_gate(
    config: &AiakosConfig,
) -> Result<ReleaseGate<FileStore>, Box<dyn std::error::Error>> {
    let store = FileStore::new(&config.ledger.state_path);
    Ok(ReleaseGate::open(store).await?)
}

/// Take the hash given on the command line, or digest the given file.
pub fn resolve_hash(
    hash: Option<ContentHash>,
    file: Option<&Path>,
) -> Result<ContentHash, Box<dyn std::error::Error>> {
    match (hash, file) {
        (Some(hash), _) => Ok(hash),
        (None, Some(path)) => ContentHash::digest_file(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e).into()),
        (None, None) => Err("either --hash or --file is required".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "0000000000000000000000000000000000000000000000000000000000000000";
    const HASH: &str = "6412de0cd1e0c7c92664a6c11629949a935eccc1c11e639d8c9c84e15cafff3a";

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from([
            "aiakos",
            "init",
            "--caller",
            OWNER,
            "--required-approvals",
            "2",
        ]);

        match cli.command {
            Commands::Init {
                caller,
                required_approvals,
            } => {
                assert_eq!(caller, Identity::new([0; 32]));
                assert_eq!(required_approvals, 2);
            }
            _ => panic!("Expected Init command"),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_parse_global_config() {
        let cli = Cli::parse_from(["aiakos", "status", "--config", "/etc/aiakos/config.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/aiakos/config.toml")));
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_cli_parse_deploy_release_with_hash() {
        let cli = Cli::parse_from([
            "aiakos",
            "deploy-release",
            "--caller",
            OWNER,
            "--release-version",
            "1.0.0",
            "--hash",
            HASH,
        ]);

        match cli.command {
            Commands::DeployRelease {
                release_version,
                hash,
                file,
                ..
            } => {
                assert_eq!(release_version, "1.0.0");
                assert_eq!(hash, Some(HASH.parse().unwrap()));
                assert!(file.is_none());
            }
            _ => panic!("Expected DeployRelease command"),
        }
    }

    #[test]
    fn test_cli_deploy_release_requires_hash_or_file() {
        let result = Cli::try_parse_from([
            "aiakos",
            "deploy-release",
            "--caller",
            OWNER,
            "--release-version",
            "1.0.0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_check_release_rejects_hash_and_file() {
        let result = Cli::try_parse_from([
            "aiakos",
            "check-release",
            "--release-version",
            "1.0.0",
            "--hash",
            HASH,
            "--file",
            "/tmp/artifact.tar.gz",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_malformed_identity() {
        let result = Cli::try_parse_from(["aiakos", "am-i-maintainer", "--caller", "alice"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_events_filters() {
        let cli = Cli::parse_from([
            "aiakos",
            "events",
            "--kind",
            "release-approved",
            "--release-version",
            "1.0.0",
            "--limit",
            "5",
        ]);

        match cli.command {
            Commands::Events {
                kind,
                maintainer,
                release_version,
                limit,
            } => {
                assert_eq!(kind, Some(aiakos::ledger::EventKind::ReleaseApproved));
                assert!(maintainer.is_none());
                assert_eq!(release_version.as_deref(), Some("1.0.0"));
                assert_eq!(limit, 5);
            }
            _ => panic!("Expected Events command"),
        }
    }

    #[test]
    fn test_cli_parse_events_defaults() {
        let cli = Cli::parse_from(["aiakos", "events"]);
        match cli.command {
            Commands::Events { kind, limit, .. } => {
                assert!(kind.is_none());
                assert_eq!(limit, 50);
            }
            _ => panic!("Expected Events command"),
        }
    }

    #[test]
    fn test_cli_parse_version() {
        let cli = Cli::parse_from(["aiakos", "version"]);
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_resolve_hash_prefers_explicit() {
        let hash: ContentHash = HASH.parse().unwrap();
        assert_eq!(resolve_hash(Some(hash), None).unwrap(), hash);
    }

    #[test]
    fn test_resolve_hash_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("artifact.bin");
        std::fs::write(&path, b"artifact").unwrap();

        let hash = resolve_hash(None, Some(&path)).unwrap();
        assert_eq!(hash, ContentHash::digest(b"artifact"));
    }

    #[test]
    fn test_resolve_hash_missing_file() {
        let result = resolve_hash(None, Some(Path::new("/nonexistent/artifact.bin")));
        assert!(result.is_err());
    }
}
