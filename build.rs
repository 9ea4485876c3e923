use std::process::Command;

/// Exposes `GIT_VERSION` to the crate, reported by `health.check`.
fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-env-changed=GIT_VERSION");

    println!("cargo:rustc-env=GIT_VERSION={}", resolve_version());
}

fn resolve_version() -> String {
    // Set explicitly by container and CI builds, which have no .git
    if let Some(version) = std::env::var("GIT_VERSION")
        .ok()
        .filter(|v| !v.is_empty() && v != "dev")
    {
        return version;
    }

    let described = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|v| !v.is_empty());

    described.unwrap_or_else(|| format!("v{}-dev", env!("CARGO_PKG_VERSION")))
}
