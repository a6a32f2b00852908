use std::path::{Path, PathBuf};

use crate::shared::{fail, read_input, write_output};

pub fn merge(files: &[PathBuf], output: &Path) -> Result<(), i32> {
    let inputs = files
        .iter()
        .map(|f| read_input(f))
        .collect::<Result<Vec<_>, _>>()?;
    let merged = pdfreplace::merge_pdfs(&inputs).map_err(fail)?;
    write_output(output, &merged)?;
    println!("Merged {} files into {}", files.len(), output.display());
    Ok(())
}

pub fn reorder(file: &Path, order: &str, output: &Path) -> Result<(), i32> {
    let bytes = read_input(file)?;
    let reordered = pdfreplace::reorder_pages(&bytes, order).map_err(fail)?;
    write_output(output, &reordered)?;
    println!("Wrote {}", output.display());
    Ok(())
}

pub fn remove(file: &Path, pages: &str, output: &Path) -> Result<(), i32> {
    let bytes = read_input(file)?;
    let trimmed = pdfreplace::remove_pages(&bytes, pages).map_err(fail)?;
    write_output(output, &trimmed)?;
    println!("Wrote {}", output.display());
    Ok(())
}
