use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use sharemd_core::{ExportError, ExportOptions, export_conversation};

#[derive(Debug, Parser)]
#[command(name = "sharemd", version, about = "Convert a ChatGPT share URL into Markdown")]
struct Cli {
    /// Public ChatGPT share URL (https://chatgpt.com/share/...)
    share_url: String,

    /// Optional output markdown file path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Include tool role turns in output
    #[arg(long)]
    include_tool_turns: bool,

    /// Include assistant internal tool-action payloads
    #[arg(long)]
    include_internal_actions: bool,

    /// Include reasoning recap/thought turns
    #[arg(long)]
    include_reasoning: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> sharemd_core::Result<()> {
    let options = ExportOptions {
        include_tool_turns: cli.include_tool_turns,
        include_internal_actions: cli.include_internal_actions,
        include_reasoning: cli.include_reasoning,
    };

    let markdown = export_conversation(&cli.share_url, &options)?;

    match cli.output {
        Some(path) => {
            let absolute = write_output(&path, &markdown)?;
            println!("{}", absolute.display());
        }
        None => print!("{markdown}"),
    }

    Ok(())
}

fn write_output(path: &Path, markdown: &str) -> sharemd_core::Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = absolute.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&absolute, markdown).map_err(|source| ExportError::Io {
        path: absolute.clone(),
        source,
    })?;

    Ok(absolute)
}
