// src/watch/identity.rs

//! Subject identifiers derived from save file names.

use std::path::Path;

/// Derive the subject identifier for a save file.
///
/// The identifier is the file's base name with its final extension removed,
/// e.g. `Players/76561198000000001.json` -> `76561198000000001`. A name with
/// no extension, or whose only dot is the leading one (`.json`), is returned
/// unchanged.
///
/// Returns `None` when no identifier can be derived; such paths are not
/// subject files and their events are discarded.
pub fn subject_id(path: &Path) -> Option<String> {
    let base = path.file_name()?.to_string_lossy();
    let stem = match base.rfind('.') {
        None | Some(0) => &base[..],
        Some(idx) => &base[..idx],
    };

    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_final_extension_only() {
        assert_eq!(
            subject_id(Path::new("/srv/Players/76561198000000001.json")).as_deref(),
            Some("76561198000000001")
        );
        assert_eq!(
            subject_id(Path::new("backup.tar.gz")).as_deref(),
            Some("backup.tar")
        );
    }

    #[test]
    fn keeps_names_without_extension() {
        assert_eq!(subject_id(Path::new("/srv/README")).as_deref(), Some("README"));
        assert_eq!(subject_id(Path::new("/srv/.json")).as_deref(), Some(".json"));
    }

    #[test]
    fn trailing_dot_is_an_empty_extension() {
        assert_eq!(subject_id(Path::new("player.")).as_deref(), Some("player"));
    }

    #[test]
    fn no_file_name_yields_none() {
        assert_eq!(subject_id(Path::new("/")), None);
        assert_eq!(subject_id(Path::new("saves/..")), None);
    }
}
