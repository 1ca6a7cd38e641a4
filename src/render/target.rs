use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

/// Destination of a rendered report.
pub trait RenderTarget {
    fn write(&mut self, rendered: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct StdoutTarget;

impl RenderTarget for StdoutTarget {
    fn write(&mut self, rendered: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(rendered.as_bytes())
            .context("Failed to write report to stdout")?;
        stdout.flush()?;
        Ok(())
    }
}

/// Writes the report to a file, replacing any previous content.
#[derive(Debug, Clone)]
pub struct FileTarget {
    path: PathBuf,
}

impl FileTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RenderTarget for FileTarget {
    fn write(&mut self, rendered: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        std::fs::write(&self.path, rendered)
            .with_context(|| format!("Failed to write report to {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), "Report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_target_creates_parent_and_overwrites() {
        let dir = std::env::temp_dir().join(format!("tearsheet-target-{}", std::process::id()));
        let path = dir.join("nested").join("report.txt");
        let mut target = FileTarget::new(&path);

        target.write("first").unwrap();
        target.write("second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
