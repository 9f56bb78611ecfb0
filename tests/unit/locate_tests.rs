//! Unit tests for GAP executable discovery.
//!
//! Tests that touch `GAP_EXECUTABLE` are serialized because the
//! environment is process-global.

use std::path::{Path, PathBuf};

use gap_mcp::gap::locate::{self, GAP_EXECUTABLE_ENV};

#[test]
#[serial_test::serial]
#[allow(unsafe_code)]
fn override_path_is_trusted_verbatim() {
    unsafe {
        std::env::remove_var(GAP_EXECUTABLE_ENV);
    }

    // The override is not checked for existence; a caller who passes a
    // path takes responsibility for it.
    let path = Path::new("/definitely/not/a/real/gap");
    let resolved = locate::resolve(Some(path)).expect("override resolves");
    assert_eq!(resolved, path);
}

#[test]
#[serial_test::serial]
#[allow(unsafe_code)]
fn override_outranks_environment() {
    unsafe {
        std::env::set_var(GAP_EXECUTABLE_ENV, "/env/gap");
    }

    let resolved = locate::resolve(Some(Path::new("/override/gap"))).expect("override resolves");
    assert_eq!(resolved, PathBuf::from("/override/gap"));

    unsafe {
        std::env::remove_var(GAP_EXECUTABLE_ENV);
    }
}

#[test]
#[serial_test::serial]
#[allow(unsafe_code)]
fn environment_variable_is_trusted_verbatim() {
    unsafe {
        std::env::set_var(GAP_EXECUTABLE_ENV, "/env/only/gap");
    }

    let resolved = locate::resolve(None).expect("env var resolves");
    assert_eq!(resolved, PathBuf::from("/env/only/gap"));

    unsafe {
        std::env::remove_var(GAP_EXECUTABLE_ENV);
    }
}

#[test]
#[serial_test::serial]
#[allow(unsafe_code)]
fn empty_environment_variable_is_ignored() {
    unsafe {
        std::env::set_var(GAP_EXECUTABLE_ENV, "");
    }

    // Discovery proceeds past the empty value; whatever it finds (or not)
    // must never be the empty path.
    if let Ok(found) = locate::resolve(None) {
        assert!(!found.as_os_str().is_empty());
    }

    unsafe {
        std::env::remove_var(GAP_EXECUTABLE_ENV);
    }
}

#[test]
fn candidate_paths_cover_conventional_locations() {
    let candidates = locate::candidate_paths();

    assert!(candidates.contains(&PathBuf::from("/usr/local/bin/gap")));
    assert!(candidates.contains(&PathBuf::from("/usr/bin/gap")));
    assert!(candidates.contains(&PathBuf::from("/opt/homebrew/bin/gap")));
}

#[test]
fn home_candidate_is_probed_first_when_home_exists() {
    if let Some(home) = dirs::home_dir() {
        let candidates = locate::candidate_paths();
        assert_eq!(candidates.first(), Some(&home.join("opt/gap/gap")));
    }
}

#[cfg(unix)]
mod unix {
    use std::os::unix::fs::PermissionsExt;

    use gap_mcp::gap::locate;

    fn write_with_mode(dir: &tempfile::TempDir, name: &str, mode: u32) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").expect("write script");
        let mut perms = std::fs::metadata(&path).expect("stat").permissions();
        perms.set_mode(mode);
        std::fs::set_permissions(&path, perms).expect("chmod");
        path
    }

    #[test]
    fn executable_file_is_recognized() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write_with_mode(&temp, "gap", 0o755);
        assert!(locate::is_executable(&path));
    }

    #[test]
    fn non_executable_file_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write_with_mode(&temp, "gap", 0o644);
        assert!(!locate::is_executable(&path));
    }

    #[test]
    fn directory_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(!locate::is_executable(temp.path()));
    }

    #[test]
    fn missing_path_is_rejected() {
        assert!(!locate::is_executable(std::path::Path::new(
            "/no/such/file/gap"
        )));
    }
}
