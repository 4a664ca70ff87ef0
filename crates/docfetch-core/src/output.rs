use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// The two artifacts produced by one run
#[derive(Debug, Clone)]
pub struct Artifacts {
    /// Full rendered markup, written verbatim
    pub html: String,
    /// Extracted main-content text
    pub text: String,
}

/// Where and how large the saved artifacts are
#[derive(Debug, Clone, Serialize)]
pub struct SavedArtifacts {
    pub html_path: PathBuf,
    pub text_path: PathBuf,
    pub html_bytes: usize,
    pub text_chars: usize,
}

/// Output directory plus the caller-supplied artifact name
#[derive(Debug, Clone)]
pub struct OutputTarget {
    dir: PathBuf,
    name: String,
}

impl OutputTarget {
    /// Create a target, rejecting names that would escape the output directory
    pub fn new(dir: impl Into<PathBuf>, name: &str) -> Result<Self> {
        validate_name(name)?;
        Ok(Self {
            dir: dir.into(),
            name: name.to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn html_path(&self) -> PathBuf {
        self.dir.join(format!("{}.html", self.name))
    }

    pub fn text_path(&self) -> PathBuf {
        self.dir.join(format!("{}.txt", self.name))
    }

    /// Write both artifacts, replacing any previous run with the same name
    ///
    /// Both files are staged next to their final location and only renamed
    /// into place once both are fully written. If the text file cannot be
    /// renamed, the new HTML is removed again so the pair never mixes runs.
    pub fn write(&self, artifacts: &Artifacts) -> Result<SavedArtifacts> {
        fs::create_dir_all(&self.dir)?;

        let html_path = self.html_path();
        let text_path = self.text_path();

        tracing::debug!("Staging artifacts in {}", self.dir.display());
        let html_file = self.stage(artifacts.html.as_bytes())?;
        let text_file = self.stage(artifacts.text.as_bytes())?;

        html_file.persist(&html_path).map_err(|e| Error::Io(e.error))?;
        tracing::info!("Wrote {} bytes of HTML to {}", artifacts.html.len(), html_path.display());

        if let Err(e) = text_file.persist(&text_path) {
            if let Err(remove_err) = fs::remove_file(&html_path) {
                tracing::warn!("Failed to remove {}: {}", html_path.display(), remove_err);
            }
            return Err(Error::Io(e.error));
        }
        tracing::info!("Wrote text to {}", text_path.display());

        Ok(SavedArtifacts {
            html_path,
            text_path,
            html_bytes: artifacts.html.len(),
            text_chars: artifacts.text.chars().count(),
        })
    }

    fn stage(&self, contents: &[u8]) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!(".{}.", self.name))
            .suffix(".partial")
            .tempfile_in(&self.dir)?;
        file.write_all(contents)?;
        file.as_file().sync_all()?;
        Ok(file)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name refers to a directory")
    } else if name.contains('/') || name.contains('\\') {
        Some("name must not contain path separators")
    } else if name.contains('\0') {
        Some("name must not contain NUL bytes")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidOutputName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
