use std::fs;
use std::path::{Path, PathBuf};

use pdfreplace::UploadedFont;

/// Read an input file, printing a user-facing error on failure.
pub fn read_input(file: &Path) -> Result<Vec<u8>, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }
    fs::read(file).map_err(|e| {
        eprintln!("Error: cannot read {}: {e}", file.display());
        1
    })
}

/// Read font files the way an upload would present them: file name plus
/// contents.
pub fn read_fonts(paths: &[PathBuf]) -> Result<Vec<UploadedFont>, i32> {
    paths
        .iter()
        .map(|path| -> Result<UploadedFont, i32> {
            let data = read_input(path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(UploadedFont::new(name, data))
        })
        .collect()
}

pub fn write_output(path: &Path, bytes: &[u8]) -> Result<(), i32> {
    fs::write(path, bytes).map_err(|e| {
        eprintln!("Error: cannot write {}: {e}", path.display());
        1
    })
}

/// `dir/report.pdf` becomes `dir/report-replaced.pdf`.
pub fn default_output(file: &Path) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    file.with_file_name(format!("{stem}-replaced.pdf"))
}

/// Print a library error and map it to the exit code.
pub fn fail(err: impl std::fmt::Display) -> i32 {
    eprintln!("Error: {err}");
    1
}
