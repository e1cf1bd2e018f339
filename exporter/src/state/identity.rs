use std::fs;
use std::path::Path;

use crate::config::VersionFilesConfig;

/// Static descriptive labels attached to every emitted series.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentitySpec {
    pub name: String,
    pub version: String,
    pub chain: String,
    pub build: Option<String>,
    pub substrate_ref: Option<String>,
}

impl IdentitySpec {
    /// Label pairs in emission order; absent optional fields are skipped.
    pub fn labels(&self) -> Vec<(&'static str, String)> {
        let mut labels = vec![
            ("name", self.name.clone()),
            ("version", self.version.clone()),
            ("chain", self.chain.clone()),
        ];
        if let Some(build) = &self.build {
            labels.push(("build", build.clone()));
        }
        if let Some(substrate_ref) = &self.substrate_ref {
            labels.push(("substrate_ref", substrate_ref.clone()));
        }
        labels
    }

    /// Fills `build` and `substrate_ref` from the optional version files.
    pub fn with_version_files(mut self, cfg: &VersionFilesConfig) -> Self {
        self.build = read_build(&cfg.build_path);
        self.substrate_ref = read_substrate_ref(&cfg.substrate_ref_path);
        self
    }
}

/// Second space-separated token of the first line.
fn read_build(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    let first = contents.lines().next()?.trim();
    first.split_whitespace().nth(1).map(str::to_string)
}

/// All lines, trimmed and joined with `-`.
fn read_substrate_ref(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    Some(
        contents
            .lines()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("-"),
    )
}

/// Lifecycle of the identity cache.
///
/// `Uninitialized` until the first complete refresh. A detected head
/// regression demotes `Populated` to `Stale`: the old labels keep being
/// applied, but every scrape retries the refresh until one succeeds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum IdentityState {
    #[default]
    Uninitialized,
    Populated(IdentitySpec),
    Stale(IdentitySpec),
}

impl IdentityState {
    pub fn is_empty(&self) -> bool {
        matches!(self, IdentityState::Uninitialized)
    }

    pub fn needs_refresh(&self) -> bool {
        !matches!(self, IdentityState::Populated(_))
    }

    pub fn spec(&self) -> Option<&IdentitySpec> {
        match self {
            IdentityState::Uninitialized => None,
            IdentityState::Populated(spec) | IdentityState::Stale(spec) => Some(spec),
        }
    }

    /// `Populated → Stale`; other states are left alone.
    pub fn invalidate(&mut self) {
        if let IdentityState::Populated(spec) = self {
            *self = IdentityState::Stale(std::mem::take(spec));
        }
    }

    /// Installs a freshly fetched identity in one step.
    pub fn populate(&mut self, spec: IdentitySpec) {
        *self = IdentityState::Populated(spec);
    }
}
