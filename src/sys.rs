//! host identity and privilege.

#[cfg(target_os = "macos")]
pub mod macos;

/// a string naming the host's architecture, e.g. `arm64` or `x86_64`.
#[cfg(target_os = "macos")]
pub fn platform_id() -> String {
    macos::sysctl_string("hw.machine").unwrap_or_else(|| std::env::consts::ARCH.to_owned())
}

/// a string naming the host's architecture, e.g. `aarch64` or `x86_64`.
#[cfg(not(target_os = "macos"))]
pub fn platform_id() -> String {
    std::env::consts::ARCH.to_owned()
}

/// whether the process runs with an effective user id of root.
pub fn is_privileged() -> bool {
    // SAFETY: `geteuid` has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}
