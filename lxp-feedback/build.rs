//! Build script for lxp-feedback
//!
//! Exposes build identification to the binary:
//! - GIT_HASH: short commit hash, or "unknown" outside a git checkout
//! - BUILD_TIMESTAMP: local time of the build (RFC 3339)
//! - BUILD_PROFILE: cargo profile

use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    let values = [
        ("GIT_HASH", short_commit_hash().unwrap_or_else(|| UNKNOWN.to_string())),
        ("BUILD_TIMESTAMP", build_timestamp()),
        ("BUILD_PROFILE", std::env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string())),
    ];

    for (name, value) in values {
        println!("cargo:rustc-env={}={}", name, value);
    }
}

fn short_commit_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}

fn build_timestamp() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
}
