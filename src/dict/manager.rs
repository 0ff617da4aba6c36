use crate::checker::dictionary::Dictionary;
use anyhow::{bail, Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// Pinned commit so downloads are reproducible.
const WORDLIST_BASE_URL: &str =
    "https://raw.githubusercontent.com/dwyl/english-words/6e4bc58ad764c3e6df8b5be4048671962c9d6a23";
const WORDLIST_VERSION: &str = "2023.12";

#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryInfo {
    pub language: String,
    pub path: PathBuf,
    pub word_count: usize,
    pub size_bytes: u64,
    pub sha256: String,
}

fn data_dir() -> Result<PathBuf> {
    crate::config::Config::data_dir().context("Failed to get data directory")
}

/// Reads size, word count and content digest of one installed dictionary.
pub fn inspect(language: &str, path: &Path) -> Result<DictionaryInfo> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let dictionary = Dictionary::load_from_path(path)?;

    Ok(DictionaryInfo {
        language: language.to_string(),
        path: path.to_path_buf(),
        word_count: dictionary.len(),
        size_bytes: bytes.len() as u64,
        sha256: format!("{:x}", Sha256::digest(&bytes)),
    })
}

/// Every `*.dict` file in `dir`, sorted by language.
pub fn installed_in(dir: &Path) -> Result<Vec<DictionaryInfo>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("dict") {
            continue;
        }
        let language = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown")
            .to_string();
        found.push(inspect(&language, &path)?);
    }

    found.sort_by(|a, b| a.language.cmp(&b.language));
    Ok(found)
}

/// One lowercase word per non-empty line; single letters and comments are
/// dropped.
pub fn parse_wordlist(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| line.chars().count() > 1 && !line.starts_with('#'))
        .collect()
}

/// Builds `<dir>/<language>.dict` from a word list and returns its path.
pub fn install_into(dir: &Path, language: &str, content: &str) -> Result<PathBuf> {
    let words = parse_wordlist(content);
    if words.is_empty() {
        bail!("Word list for '{}' has no usable entries", language);
    }

    let dict_path = dir.join(format!("{}.dict", language));
    Dictionary::build_from_words(&words, &dict_path)
        .with_context(|| format!("Failed to build {}", dict_path.display()))?;
    Ok(dict_path)
}

pub fn list_dictionaries() -> Result<()> {
    let data_dir = data_dir()?;
    let installed = installed_in(&data_dir)?;

    if installed.is_empty() {
        println!("{}", "No dictionaries installed.".yellow());
        println!(
            "Run {} to download a dictionary.",
            "gecmark dict download en_US".cyan()
        );
        return Ok(());
    }

    println!("{}", "Installed dictionaries:".bold());
    println!();
    for info in &installed {
        println!(
            "  {} {} ({}, {})",
            "✓".green(),
            info.language.cyan().bold(),
            format!("{} words", info.word_count).dimmed(),
            format!("{}KB", info.size_bytes / 1024).dimmed()
        );
    }
    println!();
    println!(
        "Data directory: {}",
        data_dir.display().to_string().dimmed()
    );

    Ok(())
}

pub fn download_dictionary(language: &str) -> Result<()> {
    let wordlist_url = match language {
        "en_US" | "en_GB" => format!("{}/words_alpha.txt", WORDLIST_BASE_URL),
        other => bail!(
            "Language '{}' is not supported. Only 'en_US' and 'en_GB' are currently available.",
            other
        ),
    };

    println!(
        "{} dictionary for {} (version: {})...",
        "Downloading".cyan().bold(),
        language.yellow(),
        WORDLIST_VERSION.dimmed()
    );
    println!("Source: {}", wordlist_url.dimmed());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message("Downloading...");

    let response = reqwest::blocking::get(&wordlist_url).context("Failed to download dictionary")?;
    if !response.status().is_success() {
        pb.finish_and_clear();
        bail!("Failed to download dictionary: HTTP {}", response.status());
    }
    let content = response.text()?;
    pb.finish_with_message("Download complete");

    let dict_path = install_into(&data_dir()?, language, &content)?;
    println!(
        "{} Dictionary installed: {}",
        "✓".green().bold(),
        dict_path.display().to_string().cyan()
    );

    Ok(())
}

/// Installs a dictionary from a local word-list file.
pub fn build_dictionary(language: &str, source: &Path) -> Result<()> {
    let content = fs::read_to_string(source)
        .with_context(|| format!("Failed to read word list {}", source.display()))?;
    let dict_path = install_into(&data_dir()?, language, &content)?;

    println!(
        "{} Dictionary installed: {}",
        "✓".green().bold(),
        dict_path.display().to_string().cyan()
    );
    Ok(())
}

pub fn show_info(language: &str) -> Result<()> {
    let dict_path = data_dir()?.join(format!("{}.dict", language));

    if !dict_path.exists() {
        println!(
            "{} Dictionary for {} not found.",
            "✗".red().bold(),
            language.yellow()
        );
        println!(
            "Run {} to download it.",
            format!("gecmark dict download {}", language).cyan()
        );
        return Ok(());
    }

    let info = inspect(language, &dict_path)?;
    println!("{}", format!("Dictionary: {}", info.language).bold());
    println!("  Path: {}", info.path.display());
    println!("  Size: {} KB", info.size_bytes / 1024);
    println!("  Words: {}", info.word_count);
    println!("  SHA-256: {}", info.sha256);
    println!("  Format: FST (Finite State Transducer)");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_wordlist() {
        let words = parse_wordlist("Apple\n# comment\n\na\n  banana \n");
        assert_eq!(words, vec!["apple", "banana"]);
    }

    #[test]
    fn test_install_and_inspect() {
        let dir = tempdir().unwrap();
        let path = install_into(dir.path(), "en_TEST", "cat\ndog\ncat\n").unwrap();
        assert_eq!(path, dir.path().join("en_TEST.dict"));

        let installed = installed_in(dir.path()).unwrap();
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].language, "en_TEST");
        assert_eq!(installed[0].word_count, 2);
        assert_eq!(installed[0].sha256.len(), 64);
    }

    #[test]
    fn test_empty_wordlist_rejected() {
        let dir = tempdir().unwrap();
        assert!(install_into(dir.path(), "en_TEST", "a\nb\n").is_err());
    }

    #[test]
    fn test_installed_in_missing_dir() {
        let dir = tempdir().unwrap();
        assert!(installed_in(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_language() {
        assert!(download_dictionary("xx_XX").is_err());
    }
}
