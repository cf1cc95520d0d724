use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=SHIPPING_MANAGER_VERSION");

    let version = env::var("SHIPPING_MANAGER_VERSION")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(git_describe)
        .unwrap_or_else(|| env::var("CARGO_PKG_VERSION").unwrap_or_default());
    println!("cargo:rustc-env=SHIPPING_MANAGER_VERSION={}", version);
}

/// `v0.1.0-3-gabc1234-dirty` style version, or `None` outside a git checkout.
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    let described = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (output.status.success() && !described.is_empty()).then_some(described)
}
