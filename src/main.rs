use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use langfile::codec::{decode_entity, COMPONENT_TYPE_TAG};
use langfile::lookup::{self, extract_braced_text, extract_int_tag, strip_braced_text};
use langfile::{LanguageFile, Settings, TextEntry};

#[derive(Parser)]
#[command(name = "langfile_text_editor")]
#[command(about = "Extract, update, sort and query localization language files")]
struct Cli {
    /// Extract text fields to JSON
    #[arg(short = 'e', value_name = "LANG_FILE", conflicts_with_all = ["write_file", "sort_file", "find_file"])]
    extract_file: Option<PathBuf>,

    /// Write updated text fields back to the language file
    #[arg(short = 'w', value_name = "LANG_FILE", requires = "json_file", conflicts_with_all = ["sort_file", "find_file"])]
    write_file: Option<PathBuf>,

    /// Sort records by id
    #[arg(short = 's', value_name = "LANG_FILE", conflicts_with = "find_file")]
    sort_file: Option<PathBuf>,

    /// Print the first entity line with the given id
    #[arg(short = 'f', value_name = "LANG_FILE", requires = "id")]
    find_file: Option<PathBuf>,

    /// Entity id to look up (used with -f)
    #[arg(long, allow_hyphen_values = true)]
    id: Option<f32>,

    /// settings.json used to resolve font names (used with -f)
    #[arg(long, value_name = "SETTINGS_JSON")]
    settings: Option<PathBuf>,

    /// JSON file with updated text fields (used with -w)
    #[arg(value_name = "JSON_FILE")]
    json_file: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(path) = cli.extract_file {
        extract(&path)?;
    } else if let (Some(path), Some(json_path)) = (cli.write_file, cli.json_file) {
        update(&path, &json_path)?;
    } else if let Some(path) = cli.sort_file {
        sort(&path)?;
    } else if let (Some(path), Some(id)) = (cli.find_file, cli.id) {
        let settings = cli
            .settings
            .map(|p| Settings::load(&p).with_context(|| format!("Failed to load {}", p.display())))
            .transpose()?;
        find(&path, id, settings.as_ref())?;
    } else {
        eprintln!("Usage:");
        eprintln!("  Extract: langfile_text_editor -e <lang.txt>");
        eprintln!("  Update:  langfile_text_editor -w <lang.txt> <lang.txt.json>");
        eprintln!("  Sort:    langfile_text_editor -s <lang.txt>");
        eprintln!("  Find:    langfile_text_editor -f <lang.txt> --id <ID> [--settings <settings.json>]");
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_language_file(path: &Path) -> Result<LanguageFile> {
    let data = fs::read(path).context("Failed to read language file")?;
    Ok(LanguageFile::open(&data))
}

/// `a.txt` -> `a_<suffix>.txt`, next to the original
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let out_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{}.{}", stem, suffix, ext),
        None => format!("{}_{}", stem, suffix),
    };
    path.with_file_name(out_name)
}

fn extract(path: &Path) -> Result<()> {
    let file = read_language_file(path)?;

    let texts = file.extract_texts();
    let json = serde_json::to_string_pretty(&texts).context("Failed to serialize to JSON")?;

    let json_path = format!("{}.json", path.display());
    fs::write(&json_path, &json).context("Failed to write JSON file")?;

    println!("Extracted {} text entries to {}", texts.len(), json_path);
    Ok(())
}

fn update(path: &Path, json_path: &Path) -> Result<()> {
    let mut file = read_language_file(path)?;

    let json_data = fs::read_to_string(json_path).context("Failed to read JSON file")?;
    let texts: Vec<TextEntry> =
        serde_json::from_str(&json_data).context("Failed to parse JSON file")?;

    let updated = file.update_texts(&texts);
    file.sort_by_id();

    // Write to *_updated.<ext> to preserve the original
    let out_path = sibling_path(path, "updated");
    file.write(&out_path)
        .context("Failed to write updated language file")?;

    println!("Written {} ({} of {} text entries applied)", out_path.display(), updated, texts.len());
    Ok(())
}

fn sort(path: &Path) -> Result<()> {
    let mut file = read_language_file(path)?;
    file.sort_by_id();

    let dups = file.duplicate_entity_ids();
    if !dups.is_empty() {
        eprintln!("Warning: duplicate entity ids {:?}; only the first of each is used", dups);
    }

    let out_path = sibling_path(path, "sorted");
    file.write(&out_path).context("Failed to write sorted language file")?;

    println!(
        "Written {} ({} entities, {} groups, {} comments)",
        out_path.display(),
        file.entities.len(),
        file.groups.len(),
        file.comments.len()
    );
    Ok(())
}

fn find(path: &Path, id: f32, settings: Option<&Settings>) -> Result<()> {
    let Some(line) = lookup::find_by_id(path, id) else {
        bail!("No entity with id {} in {}", id, path.display());
    };
    println!("{}", line);

    let record = decode_entity(&line).with_context(|| format!("Entity {} is malformed", id))?;
    if record.text.is_some() {
        println!("  text:  {:?}", extract_braced_text(&line));
    }
    println!("  ctype: {}", extract_int_tag(&strip_braced_text(&line), COMPONENT_TYPE_TAG));
    if let Some(size) = record.font_size {
        println!("  size:  {:.0}", size);
    }
    if let Some(index) = record.font {
        match settings.and_then(|s| s.font_name(index)) {
            Some(name) => println!("  font:  {} ({})", index, name),
            None => println!("  font:  {}", index),
        }
    }
    if let Some(alignment) = record.alignment {
        println!("  align: {:?}", alignment);
    }
    if let Some(reverse) = record.reverse {
        println!("  rev:   {:?}", reverse);
    }
    Ok(())
}
