/// Display version information
pub fn execute() {
    println!("aiakos {}", env!("CARGO_PKG_VERSION"));
    println!("Multi-party release approval gate");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_execute() {
        // Version command should not panic
        execute();
    }
}
