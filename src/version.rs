//! Version and build information embedded by `build.rs`.

use std::fmt;

/// Build information captured at compile time
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub git_hash: &'static str,
    git_dirty: &'static str,
    pub build_timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            git_hash: env!("PERSONA_AGENT_GIT_HASH"),
            git_dirty: env!("PERSONA_AGENT_GIT_DIRTY"),
            build_timestamp: env!("PERSONA_AGENT_BUILD_TIMESTAMP"),
            target: env!("PERSONA_AGENT_TARGET"),
            profile: env!("PERSONA_AGENT_PROFILE"),
            rustc_version: env!("PERSONA_AGENT_RUSTC_VERSION"),
        }
    }

    /// Whether the working tree had uncommitted changes at build time
    pub fn git_dirty(&self) -> bool {
        self.git_dirty == "true"
    }

    /// Version with git suffix, e.g. "0.1.0-abc12345"
    pub fn full_version(&self) -> String {
        let dirty = if self.git_dirty() { "-dirty" } else { "" };
        format!("{}-{}{}", self.version, self.git_hash, dirty)
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.name, self.full_version())?;
        writeln!(f)?;
        writeln!(f, "Build Information:")?;
        writeln!(f, "  Version:    {}", self.version)?;
        writeln!(f, "  Git Hash:   {}", self.git_hash)?;
        writeln!(f, "  Built:      {}", self.build_timestamp)?;
        writeln!(f, "  Profile:    {}", self.profile)?;
        writeln!(f, "  Target:     {}", self.target)?;
        writeln!(f, "  Compiler:   {}", self.rustc_version)?;
        Ok(())
    }
}

pub fn build_info() -> BuildInfo {
    BuildInfo::current()
}

/// Print version information to stdout
pub fn print_version() {
    print!("{}", build_info());
}
