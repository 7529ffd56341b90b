//! File handling and Go toolchain invocation around [`crate::compile`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use log::{debug, info};
use thiserror::Error;

use crate::codegen::{GoTarget, Target};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write '{}': {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to run `{}`: {source} (is Go installed? set --go or {})", .program.display(), crate::config::GO_ENV)]
    Spawn { program: PathBuf, source: io::Error },

    #[error("`go {action}` failed for '{}'", .path.display())]
    Toolchain { action: &'static str, path: PathBuf },
}

/// What to do with the generated Go file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// `go run` it, then delete it.
    #[default]
    Run,
    /// Keep it and stop.
    Src,
    /// `go build` an executable, deleting the source on success.
    Build,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Converted(PathBuf),
    Built(PathBuf),
    /// Exit code of the program run by `go run`.
    Ran(i32),
}

/// `prog.simple` → `prog.<extension>`, next to the input.
pub fn source_path(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

/// `prog.simple` → `prog` (`prog.exe` on Windows).
pub fn executable_path(input: &Path) -> PathBuf {
    if cfg!(windows) {
        input.with_extension("exe")
    } else {
        input.with_extension("")
    }
}

pub fn read_source(path: &Path) -> Result<String, DriverError> {
    fs::read_to_string(path).map_err(|source| DriverError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub struct Driver {
    go: PathBuf,
    extension: &'static str,
    mode: Mode,
    output: Option<PathBuf>,
}

impl Driver {
    pub fn new(go: PathBuf) -> Self {
        Driver {
            go,
            extension: GoTarget::new().extension(),
            mode: Mode::Run,
            output: None,
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Name of the built executable. Only used in [`Mode::Build`].
    pub fn output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn artifact_path(&self, input: &Path) -> PathBuf {
        self.output.clone().unwrap_or_else(|| executable_path(input))
    }

    /// Writes `generated` next to `input` and hands it to the toolchain.
    pub fn execute(&self, input: &Path, generated: &str) -> Result<Outcome, DriverError> {
        let go_path = source_path(input, self.extension);
        write_file(&go_path, generated)?;
        info!("wrote {}", go_path.display());
        self.format(&go_path);

        match self.mode {
            Mode::Src => Ok(Outcome::Converted(go_path)),
            Mode::Build => {
                let artifact = self.artifact_path(input);
                info!("building {}", artifact.display());
                let status = self.go_command(&["build", "-o"], &[artifact.as_path(), go_path.as_path()])?;
                if !status.success() {
                    // The source stays behind for inspection
                    return Err(DriverError::Toolchain { action: "build", path: go_path });
                }
                remove_intermediate(&go_path);
                Ok(Outcome::Built(artifact))
            }
            Mode::Run => {
                info!("running {}", go_path.display());
                let status = self.go_command(&["run"], &[go_path.as_path()]);
                remove_intermediate(&go_path);
                Ok(Outcome::Ran(status?.code().unwrap_or(1)))
            }
        }
    }

    /// `go fmt` is cosmetic: failures are logged and otherwise ignored.
    fn format(&self, go_path: &Path) {
        match Command::new(&self.go).arg("fmt").arg(go_path).output() {
            Ok(out) if out.status.success() => debug!("formatted {}", go_path.display()),
            Ok(out) => debug!("go fmt exited with {}", out.status),
            Err(e) => debug!("go fmt unavailable: {}", e),
        }
    }

    fn go_command(&self, args: &[&str], paths: &[&Path]) -> Result<ExitStatus, DriverError> {
        Command::new(&self.go)
            .args(args)
            .args(paths)
            .status()
            .map_err(|source| DriverError::Spawn {
                program: self.go.clone(),
                source,
            })
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), DriverError> {
    fs::write(path, contents).map_err(|source| DriverError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn remove_intermediate(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        debug!("could not remove {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_toolchain() -> PathBuf {
        PathBuf::from("/nonexistent/simplec-test/go")
    }

    #[test]
    fn test_output_names() {
        let input = Path::new("dir/hello.simple");
        assert_eq!(source_path(input, "go"), PathBuf::from("dir/hello.go"));
        if cfg!(windows) {
            assert_eq!(executable_path(input), PathBuf::from("dir/hello.exe"));
        } else {
            assert_eq!(executable_path(input), PathBuf::from("dir/hello"));
        }
    }

    #[test]
    fn test_intermediate_extension_comes_from_target() {
        let driver = Driver::new(missing_toolchain());
        assert_eq!(driver.extension, GoTarget::new().extension());
    }

    #[test]
    fn test_artifact_override() {
        let driver = Driver::new(missing_toolchain()).output(Some(PathBuf::from("out/app")));
        assert_eq!(driver.artifact_path(Path::new("hello.simple")), PathBuf::from("out/app"));
    }

    #[test]
    fn test_src_mode_keeps_file_without_toolchain() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("prog.simple");
        let driver = Driver::new(missing_toolchain()).mode(Mode::Src);

        let outcome = driver.execute(&input, "package main\n").unwrap();
        let go_path = dir.path().join("prog.go");
        assert_eq!(outcome, Outcome::Converted(go_path.clone()));
        assert_eq!(fs::read_to_string(go_path).unwrap(), "package main\n");
    }

    #[test]
    fn test_run_mode_reports_missing_toolchain_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("prog.simple");
        let driver = Driver::new(missing_toolchain());

        let err = driver.execute(&input, "package main\n").unwrap_err();
        assert!(matches!(err, DriverError::Spawn { .. }));
        assert!(err.to_string().contains("SIMPLEC_GO"));
        assert!(!dir.path().join("prog.go").exists());
    }

    #[test]
    fn test_build_mode_keeps_source_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("prog.simple");
        let driver = Driver::new(missing_toolchain()).mode(Mode::Build);

        assert!(driver.execute(&input, "package main\n").is_err());
        assert!(dir.path().join("prog.go").exists());
    }

    #[test]
    fn test_read_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(&dir.path().join("absent.simple")).unwrap_err();
        assert!(err.to_string().starts_with("cannot read '"));
    }
}
