use std::path::{Path, PathBuf};

use pdfreplace::{EngineConfig, ReplaceRequest, ReplaceSummary, Scope, replace_text};

use crate::cli::OutputFormat;
use crate::shared::{default_output, fail, read_fonts, read_input, write_output};

/// Arguments of the `replace` subcommand.
pub struct ReplaceArgs<'a> {
    pub file: &'a Path,
    pub find: &'a str,
    pub replace: &'a str,
    pub scope: &'a str,
    pub from_page: Option<i64>,
    pub to_page: Option<i64>,
    pub font: Option<&'a str>,
    pub font_files: &'a [PathBuf],
    pub fonts_dir: Option<&'a Path>,
    pub output: Option<&'a Path>,
    pub format: &'a OutputFormat,
}

pub fn run(args: ReplaceArgs<'_>) -> Result<(), i32> {
    let scope = Scope::parse(args.scope, args.from_page, args.to_page).map_err(fail)?;
    let bytes = read_input(args.file)?;

    let mut request = ReplaceRequest::new(args.find, args.replace).with_scope(scope);
    request.font_choice = args.font.map(str::to_string);
    request.uploaded_fonts = read_fonts(args.font_files)?;

    let mut config = EngineConfig::from_env();
    if let Some(dir) = args.fonts_dir {
        config = config.with_configured_fonts_dir(dir);
    }

    let summary = replace_text(&bytes, &request, &config).map_err(fail)?;
    let output = args
        .output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(args.file));
    write_output(&output, &summary.bytes)?;

    match args.format {
        OutputFormat::Text => print_text(&summary, &output),
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "output": output.display().to_string(),
                "replacements": summary.replacements,
                "diagnostics": summary.diagnostics,
            });
            println!("{}", serde_json::to_string(&obj).map_err(fail)?);
        }
    }
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn print_text(summary: &ReplaceSummary, output: &Path) {
    println!("Replacements: {}", summary.replacements);
    if let Some(diag) = &summary.diagnostics {
        let detected = if diag.detected_font.is_empty() {
            "(none)"
        } else {
            diag.detected_font.as_str()
        };
        println!(
            "Detected font: {detected} (bold: {}, italic: {})",
            yes_no(diag.detected_bold),
            yes_no(diag.detected_italic)
        );
        println!("Used font: {} ({})", diag.used_font, diag.used_source);
    }
    println!("Output: {}", output.display());
}
