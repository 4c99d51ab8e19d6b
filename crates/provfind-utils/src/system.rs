/// Retrieves the operating system name as registries spell it.
///
/// Rust's `macos` is published as `darwin`; every other OS name
/// (`linux`, `windows`, `freebsd`, ...) is used as-is.
pub fn os() -> &'static str {
    registry_os(std::env::consts::OS)
}

/// Retrieves the CPU architecture name as registries spell it
/// (`amd64`, `arm64`, `386`, `arm`, ...).
pub fn arch() -> &'static str {
    registry_arch(std::env::consts::ARCH)
}

/// Retrieves the platform string in the format `os_arch`, e.g. `linux_amd64`.
pub fn platform() -> String {
    format!("{}_{}", os(), arch())
}

fn registry_os(os: &'static str) -> &'static str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

fn registry_arch(arch: &'static str) -> &'static str {
    match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        "s390x" => "s390x",
        other => other,
    }
}
