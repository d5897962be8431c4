use aiakos::ledger::ContentHash;
use std::path::Path;

/// Print the SHA-256 content hash of a local file
pub fn execute(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let hash = ContentHash::digest_file(file)
        .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;
    println!("{}", hash);
    Ok(())
}
