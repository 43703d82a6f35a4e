//! Layoutc CLI - layoutc command

use anyhow::{Context, Result};
use clap::Parser;
use layoutc_compiler::LayoutCompiler;
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Layoutc - compile XML layout resources into id-resolved runtime assets
#[derive(Parser)]
#[command(name = "layoutc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing the layout XML files
    res_dir: PathBuf,

    /// Directory to write compiled output into
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut compiler = LayoutCompiler::new();
    let outcome = compiler
        .compile(&cli.res_dir, &cli.out_dir)
        .with_context(|| format!("failed to compile layouts in {}", cli.res_dir.display()))?;

    if outcome.changed {
        println!(
            "{} {} layout file(s) compiled, {} view id(s) assigned",
            "done:".green().bold(),
            outcome.processed,
            compiler.view_ids().len()
        );
    } else {
        println!("{} layouts are up to date", "done:".green().bold());
    }

    Ok(())
}
