//! Shell scripts standing in for the convolution program.
//!
//! Each helper installs an executable `/bin/sh` script into a directory so
//! tests can exercise real process launches without a compiled program.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name the harness looks for by default.
pub const PROGRAM_NAME: &str = "convolution";

/// Writes `body` as an executable shell script at `dir/name`.
///
/// # Errors
/// Returns any error raised while writing the file or changing its mode.
pub fn install_script(dir: &Path, name: &str, body: &str) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    make_executable(&path)?;
    Ok(path)
}

/// Installs a program that copies `source` (relative to its working
/// directory) to `output.txt`.
///
/// # Errors
/// Same as [`install_script`].
pub fn install_copying_program(dir: &Path, source: &str) -> io::Result<PathBuf> {
    install_script(dir, PROGRAM_NAME, &format!("cp '{source}' output.txt"))
}

/// Installs a program that writes `text` verbatim to `output.txt`.
///
/// # Errors
/// Same as [`install_script`].
pub fn install_echo_program(dir: &Path, text: &str) -> io::Result<PathBuf> {
    fs::write(dir.join("canned-output.txt"), text)?;
    install_copying_program(dir, "canned-output.txt")
}

/// Installs a program that writes nothing and exits with `code`.
///
/// # Errors
/// Same as [`install_script`].
pub fn install_exiting_program(dir: &Path, code: i32) -> io::Result<PathBuf> {
    install_script(dir, PROGRAM_NAME, &format!("exit {code}"))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    fn install_script_prefixes_shebang() {
        let dir = TempDir::new().expect("create temp dir");
        let path = install_script(dir.path(), "prog", "true").expect("install script");
        let body = fs::read_to_string(&path).expect("read script");
        assert_eq!(body, "#!/bin/sh\ntrue\n");
    }

    #[cfg(unix)]
    #[rstest]
    fn installed_scripts_are_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("create temp dir");
        let path = install_exiting_program(dir.path(), 3).expect("install script");
        let mode = fs::metadata(&path).expect("stat script").permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[rstest]
    fn echo_program_stores_canned_output() {
        let dir = TempDir::new().expect("create temp dir");
        install_echo_program(dir.path(), "1 \n").expect("install script");
        let canned = fs::read_to_string(dir.path().join("canned-output.txt")).expect("read");
        assert_eq!(canned, "1 \n");
    }
}
