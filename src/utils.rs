/// Check if current user has root privileges
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Get current username
pub fn get_username() -> String {
    whoami::username()
}

/// Check if a command is available on the system
pub async fn is_command_available(command: &str) -> bool {
    let status = tokio::process::Command::new("sh")
        .args(["-c", "command -v \"$0\"", command])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await;

    match status {
        Ok(status) => status.success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_command_availability() {
        assert!(is_command_available("sh").await);
        assert!(!is_command_available("basher-no-such-binary").await);
    }

    #[test]
    fn test_username_is_not_empty() {
        assert!(!get_username().is_empty());
    }
}
