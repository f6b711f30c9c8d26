use std::path::{Component, Path};

use anyhow::{Result, bail};

/// Validates that a namespace entry name is safe to join onto an output directory
///
/// Namespace names come from archive content (document filenames in particular), so before
/// anything is written to disk each name must be exactly one normal path component.
///
/// # Errors
///
/// Returns an error if the name:
/// - is empty
/// - contains a path separator or NUL byte
/// - is `.` or `..`, or otherwise not a single normal component (e.g. a Windows prefix)
pub fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Entry name is empty");
    }

    if name.contains(['/', '\\', '\0']) {
        bail!("Entry name contains a path separator: {:?}", name);
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => bail!("Entry name is not a plain file name: {:?}", name),
    }
}

/// Normalizes an archive member path to a `/`-separated relative name
///
/// Leading `./` and `/` are dropped and backslashes are treated as separators, so zip
/// members and files under an extracted export directory share one naming scheme.
pub fn normalize_member_name(name: &str) -> String {
    let unified = name.replace('\\', "/");
    let mut trimmed = unified.as_str();
    loop {
        if let Some(rest) = trimmed.strip_prefix("./") {
            trimmed = rest;
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            trimmed = rest;
        } else {
            break;
        }
    }
    trimmed.to_string()
}
