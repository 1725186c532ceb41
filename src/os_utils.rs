//! Filesystem and os-level settings
//!

use camino::Utf8Path;

/// Create a directory and all of its parents if it does not exist already
///
/// * `label` - describes the directory in an error message
///
pub fn create_dir_all(dir: &Utf8Path, label: &str) {
    if dir.is_dir() {
        return;
    }
    if let Err(e) = std::fs::create_dir_all(dir) {
        panic!("Can't create new {label} directory at '{dir}': {e}");
    }
}

/// Attempt to increase the open file limit to the system's hard limit on *nix-like systems
///
/// Every worker thread holds an open alignment file reader. Failure is ignored.
///
pub fn attempt_max_open_file_limit() {
    use rlimit::Resource;

    let Ok((soft, hard)) = Resource::NOFILE.get() else {
        return;
    };

    if soft < hard {
        rlimit::setrlimit(Resource::NOFILE, hard, hard).unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_dir_all() {
        let dir = tempfile::tempdir().unwrap();
        let dir = Utf8Path::from_path(dir.path()).unwrap();
        let new_dir = dir.join("a").join("b");

        create_dir_all(&new_dir, "test");
        assert!(new_dir.is_dir());

        // Existing directory is accepted
        create_dir_all(&new_dir, "test");
        assert!(new_dir.is_dir());
    }
}
