mod cli;
mod pages_cmd;
mod replace_cmd;
mod shared;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = if verbose > 0 { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Replace {
            ref file,
            ref find,
            ref replace,
            ref scope,
            from_page,
            to_page,
            ref font,
            ref font_files,
            ref fonts_dir,
            ref output,
            ref format,
        } => replace_cmd::run(replace_cmd::ReplaceArgs {
            file,
            find,
            replace,
            scope,
            from_page,
            to_page,
            font: font.as_deref(),
            font_files,
            fonts_dir: fonts_dir.as_deref(),
            output: output.as_deref(),
            format,
        }),
        Commands::Merge {
            ref files,
            ref output,
        } => pages_cmd::merge(files, output),
        Commands::Reorder {
            ref file,
            ref order,
            ref output,
        } => pages_cmd::reorder(file, order, output),
        Commands::Remove {
            ref file,
            ref pages,
            ref output,
        } => pages_cmd::remove(file, pages, output),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
