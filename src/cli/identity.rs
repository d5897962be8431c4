use super::config::AiakosConfig;
use aiakos::identity::derive_identity;

/// Print the identity derived from `name` and the configured salt
pub fn execute(config: &AiakosConfig, name: &str) {
    let identity = derive_identity(name, config.identity.salt.as_bytes());
    println!("{}", identity);
}
