use crate::archive::write_file;
use crate::error::{HarvestError, Result};
use crate::parsers::html::extract_text;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of converting an archive directory to text
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertReport {
    pub converted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// Convert every `.html` file under `html_dir` into `<text_dir>/<stem>.txt`
///
/// Sub-directories are walked recursively and flattened into `text_dir`.
/// Unreadable files are reported and skipped; failing to create `text_dir`
/// or to list `html_dir` ends the conversion.
pub async fn convert_directory(html_dir: &Path, text_dir: &Path) -> Result<ConvertReport> {
    tokio::fs::create_dir_all(text_dir)
        .await
        .map_err(|source| HarvestError::Setup {
            path: text_dir.to_path_buf(),
            source,
        })?;

    let mut report = ConvertReport::default();
    let mut pending = vec![html_dir.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "html") {
                files.push(path);
            }
        }
        files.sort();

        for path in files {
            ::log::info!("Processing file: {}", path.display());
            match convert_file(&path, text_dir).await {
                Ok(output) => {
                    ::log::info!("Saved text of {} to {}", path.display(), output.display());
                    report.converted.push(output);
                }
                Err(e) => {
                    ::log::error!("Failed to convert {}: {}", path.display(), e);
                    report.failed.push((path, e.to_string()));
                }
            }
        }
    }

    Ok(report)
}

async fn convert_file(path: &Path, text_dir: &Path) -> Result<PathBuf> {
    let html = tokio::fs::read_to_string(path).await?;
    let stem = path
        .file_stem()
        .ok_or_else(|| HarvestError::Config(format!("no file name in {}", path.display())))?;

    let mut name = stem.to_os_string();
    name.push(".txt");
    let output = text_dir.join(name);
    write_file(&output, extract_text(&html).as_bytes()).await?;
    Ok(output)
}
