// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Default installation root scanned for SAE version folders.
pub const DEFAULT_INSTALL_ROOT: &str = r"C:\Program Files (x86)\Aspel";

/// Version folders look like `Aspel-SAE 7.0` (the prefix match is
/// case-insensitive; a bare `Aspel-SAE 7` is accepted as 7.0).
pub const VERSION_FOLDER_PREFIX: &str = "Aspel-SAE ";

/// Oldest release that ships the Firebird company database layout.
pub const MIN_SUPPORTED_VERSION: SaeVersion = SaeVersion { major: 6, minor: 0 };

/// An SAE release parsed from a version-folder name. Ordering compares
/// major first, then minor; an unparsable name produces `None`, and
/// `Option`'s ordering already puts `None` below every parsed version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SaeVersion {
    pub major: u32,
    pub minor: u32,
}

impl SaeVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parses `Aspel-SAE <major>[.<minor>]`; anything else is not a
    /// version folder and yields `None`.
    pub fn parse_folder(name: &str) -> Option<Self> {
        let name = name.trim();
        let head = name.get(..VERSION_FOLDER_PREFIX.len())?;
        if !head.eq_ignore_ascii_case(VERSION_FOLDER_PREFIX) {
            return None;
        }

        let tail = &name[VERSION_FOLDER_PREFIX.len()..];
        match tail.split_once('.') {
            Some((major, minor)) => Some(Self {
                major: parse_component(major)?,
                minor: parse_component(minor)?,
            }),
            None => Some(Self {
                major: parse_component(tail)?,
                minor: 0,
            }),
        }
    }

    pub fn folder_name(self) -> String {
        format!("{VERSION_FOLDER_PREFIX}{}.{}", self.major, self.minor)
    }

    /// Relative path from the version folder to the first company's
    /// database file, e.g. `Empresa01/Datos/SAE70EMPRE01.FDB`.
    pub fn company_subpath(self) -> PathBuf {
        ["Empresa01", "Datos"]
            .iter()
            .collect::<PathBuf>()
            .join(format!("SAE{}{}EMPRE01.FDB", self.major, self.minor))
    }
}

impl std::fmt::Display for SaeVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn parse_component(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Resolves the path to the company database file.
///
/// An override that exists on disk wins outright. Otherwise the
/// installation root is scanned for version folders at or above
/// [`MIN_SUPPORTED_VERSION`], newest first, and the first folder whose
/// company file exists wins. When nothing matches, the canonical default
/// for the minimum version is returned even if absent; opening the session
/// surfaces the failure with the full path in the message.
pub fn resolve_database_path(root: &Path, override_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path {
        if path.exists() {
            return path.to_path_buf();
        }
        warn!(
            "configured database override {} does not exist; scanning {}",
            path.display(),
            root.display()
        );
    }

    let mut installed = installed_versions(root);
    installed.retain(|(version, _)| *version >= MIN_SUPPORTED_VERSION);
    installed.sort_by(|(a, _), (b, _)| b.cmp(a));

    for (version, folder) in installed {
        let candidate = root.join(&folder).join(version.company_subpath());
        if candidate.exists() {
            return candidate;
        }
        debug!(
            "version folder {folder} has no company database at {}",
            candidate.display()
        );
    }

    let fallback = root
        .join(MIN_SUPPORTED_VERSION.folder_name())
        .join(MIN_SUPPORTED_VERSION.company_subpath());
    debug!(
        "no installed company database found under {}; falling back to {}",
        root.display(),
        fallback.display()
    );
    fallback
}

/// Version folders actually present under the installation root, with the
/// directory names as found on disk so case-insensitive matches resolve on
/// case-sensitive filesystems. A missing or unreadable root is an empty
/// result, not an error.
fn installed_versions(root: &Path) -> Vec<(SaeVersion, String)> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };

    entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            SaeVersion::parse_folder(&name).map(|version| (version, name))
        })
        .collect()
}
