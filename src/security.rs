#![forbid(unsafe_code)]

//! Shared security helpers used by the showcase binaries.

use anyhow::{Result, bail};
use nix::unistd::Uid;

pub const INCORRECT_SECRET_MESSAGE: &str = "Incorrect password. Please try again.";

/// Fails fast when a binary is started as root.
pub fn ensure_not_root(process: &str) -> Result<()> {
    ensure_not_root_for(Uid::current(), process)
}

fn ensure_not_root_for(uid: Uid, process: &str) -> Result<()> {
    if uid.is_root() {
        bail!("{process} must not be run as root; use a regular user or a dedicated service account");
    }
    Ok(())
}

/// Single shared-secret gate in front of the admin operations.
///
/// Secrets are compared through their BLAKE3 digests, whose equality check
/// runs in constant time.
#[derive(Clone)]
pub struct AdminGate {
    digest: Option<blake3::Hash>,
}

impl AdminGate {
    /// `None` or a blank secret leaves the gate permanently closed.
    pub fn new(secret: Option<&str>) -> Self {
        let digest = secret
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
            .map(|secret| blake3::hash(secret.as_bytes()));
        Self { digest }
    }

    pub fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    pub fn check(&self, candidate: &str) -> bool {
        match &self.digest {
            Some(expected) => *expected == blake3::hash(candidate.trim().as_bytes()),
            None => false,
        }
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::Uid;

    #[test]
    fn ensure_not_root_allows_unprivileged_uid() {
        assert!(ensure_not_root_for(Uid::from_raw(1000), "tester").is_ok());
    }

    #[test]
    fn ensure_not_root_rejects_root_uid() {
        let err = ensure_not_root_for(Uid::from_raw(0), "tester").unwrap_err();
        assert!(err.to_string().contains("must not be run as root"));
    }

    #[test]
    fn gate_accepts_only_the_secret() {
        let gate = AdminGate::new(Some("1234567890"));
        assert!(gate.is_enabled());
        assert!(gate.check("1234567890"));
        assert!(gate.check(" 1234567890\n"));
        assert!(!gate.check("123456789"));
        assert!(!gate.check(""));
    }

    #[test]
    fn gate_without_secret_rejects_everything() {
        for gate in [AdminGate::new(None), AdminGate::new(Some("  "))] {
            assert!(!gate.is_enabled());
            assert!(!gate.check(""));
            assert!(!gate.check("anything"));
        }
    }

    #[test]
    fn debug_output_hides_digest() {
        let rendered = format!("{:?}", AdminGate::new(Some("secret")));
        assert_eq!(rendered, "AdminGate { enabled: true }");
    }
}
