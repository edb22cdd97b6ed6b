//! The two protocol files shared with the program under test.
//!
//! A [`Workspace`] is the directory the program runs in together with the
//! names of its input and output files. Files are created, flushed and closed
//! within a single call so a failure never leaves a handle open.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::codec;
use crate::error::{FsOperation, HarnessError, Result};
use crate::matrix::Matrix;

/// Default input file name understood by the program.
pub const DEFAULT_INPUT: &str = "input.txt";
/// Default output file name written by the program.
pub const DEFAULT_OUTPUT: &str = "output.txt";

/// Directory and file names used to talk to the program.
///
/// # Examples
/// ```
/// use std::path::Path;
/// use convcheck_core::Workspace;
///
/// let workspace = Workspace::new("/tmp/run");
/// assert_eq!(workspace.input_path(), Path::new("/tmp/run/input.txt"));
/// assert_eq!(workspace.output_path(), Path::new("/tmp/run/output.txt"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    input: PathBuf,
    output: PathBuf,
}

impl Workspace {
    /// Uses `root` with the default `input.txt` and `output.txt` names.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_file_names(root, DEFAULT_INPUT, DEFAULT_OUTPUT)
    }

    /// Uses `root` with custom file names. Relative names resolve against
    /// `root`.
    #[must_use]
    pub fn with_file_names(
        root: impl Into<PathBuf>,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Self {
        let root = root.into();
        let input = root.join(input);
        let output = root.join(output);
        Self {
            root,
            input,
            output,
        }
    }

    /// Directory the program runs in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the input file.
    #[must_use]
    pub fn input_path(&self) -> &Path {
        &self.input
    }

    /// Path of the output file.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Removes stale input and output files.
    ///
    /// Missing files are fine, so calling this twice in a row succeeds.
    ///
    /// # Errors
    /// Returns [`HarnessError::Filesystem`] for any removal failure other than
    /// the file not existing.
    #[instrument(name = "workspace.clean", level = "debug", err, skip(self))]
    pub fn clean(&self) -> Result<()> {
        remove_if_present(&self.input)?;
        remove_if_present(&self.output)?;
        Ok(())
    }

    /// Writes signal `a` and kernel `b` to the input file.
    ///
    /// # Errors
    /// Returns [`HarnessError::Filesystem`] when the file cannot be created,
    /// written or flushed.
    #[instrument(
        name = "workspace.write_input",
        level = "debug",
        err,
        skip_all,
        fields(n = a.size(), m = b.size()),
    )]
    pub fn write_input(&self, a: &Matrix, b: &Matrix) -> Result<()> {
        let write_error = |source| HarnessError::Filesystem {
            operation: FsOperation::Write,
            path: self.input.clone(),
            source,
        };
        let file = File::create(&self.input).map_err(write_error)?;
        let mut writer = BufWriter::new(file);
        codec::write_input(&mut writer, a, b).map_err(write_error)?;
        writer.flush().map_err(write_error)?;
        Ok(())
    }

    /// Reads and decodes the output file.
    ///
    /// # Errors
    /// Returns [`HarnessError::MissingResource`] when the file does not exist,
    /// [`HarnessError::Filesystem`] when it cannot be read and
    /// [`HarnessError::Format`] when its contents are malformed.
    #[instrument(name = "workspace.read_output", level = "debug", err, skip(self))]
    pub fn read_output(&self) -> Result<Matrix> {
        let text = fs::read_to_string(&self.output).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                HarnessError::MissingResource {
                    path: self.output.clone(),
                }
            } else {
                HarnessError::Filesystem {
                    operation: FsOperation::Read,
                    path: self.output.clone(),
                    source,
                }
            }
        })?;
        codec::decode_output(&text).map_err(|source| HarnessError::Format {
            path: self.output.clone(),
            source,
        })
    }
}

/// Removes `path`, treating a missing file as success.
///
/// Returns `true` when a file was actually removed.
///
/// # Errors
/// Returns [`HarnessError::Filesystem`] for any failure other than
/// [`io::ErrorKind::NotFound`].
pub fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale file");
            Ok(true)
        }
        Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(HarnessError::Filesystem {
            operation: FsOperation::Remove,
            path: path.to_path_buf(),
            source,
        }),
    }
}
