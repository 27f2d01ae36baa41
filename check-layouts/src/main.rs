use buffert::{BufferDeclaration, BufferTemplate, DeclarationError};
use clap::Parser;

use std::path::{Path, PathBuf};

/// Lay out RON buffer declarations and print the resulting GLSL.
#[derive(Parser, Debug)]
#[clap(name = "check-layouts")]
struct Args {
    /// Declaration files, or directories to search for .ron files
    #[clap(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Qualifier put in front of the block keyword, e.g. readonly
    #[clap(long)]
    qualifier: Option<String>,

    /// Also print the offset, stride and size of every entry
    #[clap(long)]
    offsets: bool,
}

fn is_declaration(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "ron")
}

fn collect(paths: &[PathBuf]) -> (Vec<PathBuf>, usize) {
    let mut files = Vec::new();
    let mut err_count = 0;
    let mut queue: Vec<PathBuf> = paths.to_vec();

    while let Some(path) = queue.pop() {
        if path.is_file() {
            if is_declaration(&path) {
                files.push(path);
            } else if paths.contains(&path) {
                println!("WARNING: {} is not a .ron file. Skipping.", path.display());
            }
        } else if path.is_dir() {
            match std::fs::read_dir(&path) {
                Ok(entries) => queue.extend(entries.filter_map(|e| e.ok()).map(|e| e.path())),
                Err(e) => {
                    println!("ERROR: Failed to read directory {}: {e}", path.display());
                    err_count += 1;
                }
            }
        } else {
            println!("ERROR: {} does not exist", path.display());
            err_count += 1;
        }
    }

    files.sort();
    (files, err_count)
}

fn print_offsets(template: &BufferTemplate) {
    let entries = match template.entries_structs() {
        Ok(entries) => entries,
        Err(e) => {
            println!("Can't list offsets: {e}");
            return;
        }
    };

    println!(
        "{:<24} {:>8} {:>8} {:>8} {:>6}  format",
        "name", "offset", "stride", "size", "count"
    );
    for e in entries {
        println!(
            "{:<24} {:>8} {:>8} {:>8} {:>6}  {}",
            e.name(),
            e.offset(),
            e.stride(),
            e.size(),
            e.count(),
            e.format()
        );
    }
    println!("total size: {}", template.size());
}

fn check(path: &Path, args: &Args) -> Result<(), DeclarationError> {
    let template = BufferDeclaration::load_file(path)?.build()?;
    log::debug!("{} lays out {}", path.display(), template.name());

    println!("{}", template.to_glsl_string(args.qualifier.as_deref()));
    if args.offsets {
        print_offsets(&template);
        println!();
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let (files, mut err_count) = collect(&args.paths);

    let count = files.len();
    println!("Found {count} buffer declarations");
    for (idx, file) in files.iter().enumerate() {
        let display = file.display();
        println!("[{i}/{count}] Checking {display}", i = idx + 1);

        if let Err(e) = check(file, &args) {
            println!();
            println!("ERROR: Failed to lay out {display}");
            println!("{e}");
            println!();
            err_count += 1;
        }
    }

    println!("{} declarations failed", err_count);
    if err_count > 0 {
        std::process::exit(1);
    }
}
