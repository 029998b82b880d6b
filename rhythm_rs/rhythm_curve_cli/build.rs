use std::process::Command;

/// Short hash of the checked-out commit, when built from a git worktree.
fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=10", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_owned())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    for git_file in ["../../.git/HEAD", "../../.git/refs/heads"] {
        println!("cargo:rerun-if-changed={git_file}");
    }

    let hash = git_short_hash().unwrap_or_else(|| String::from("unknown"));
    println!("cargo:rustc-env=GIT_COMMIT_HASH={hash}");
}
