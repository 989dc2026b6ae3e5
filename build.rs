use std::process::Command;

/// Short hash of HEAD, if this is a git checkout with git available.
fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    let hash = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!hash.is_empty()).then_some(hash)
}

fn main() {
    // Release builds pin the version explicitly; local builds fall back to git.
    let version = std::env::var("TIMELINE_VERSION").unwrap_or_else(|_| {
        let pkg = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
        match git_short_hash() {
            Some(hash) => format!("{pkg}-{hash}"),
            None => format!("{pkg}-dev"),
        }
    });
    println!("cargo:rustc-env=TIMELINE_VERSION={version}");
}
