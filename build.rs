use std::env;
use std::process::Command;

const PREFIX: &str = "TALLY_CORE_BUILD";

fn main() {
    for path in ["build.rs", ".git/HEAD", ".git/refs"] {
        println!("cargo:rerun-if-changed={path}");
    }

    let hash = git(&["rev-parse", "--short", "HEAD"]).filter(|hash| !hash.is_empty());
    let status = git(&["status", "--porcelain"]).map(|changes| {
        if changes.is_empty() {
            "clean".to_string()
        } else {
            "dirty".to_string()
        }
    });
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    let metadata = [
        ("HASH", hash),
        ("STATUS", status),
        ("TIMESTAMP", Some(timestamp)),
        ("TARGET", env::var("TARGET").ok()),
        ("PROFILE", env::var("PROFILE").ok()),
    ];
    for (key, value) in metadata {
        let value = value.unwrap_or_else(|| "unknown".to_string());
        println!("cargo:rustc-env={PREFIX}_{key}={value}");
    }
}

/// Trimmed stdout of a successful git invocation.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|text| text.trim().to_string())
}
