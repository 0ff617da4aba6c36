use crate::error::{GecError, Result};
use fst::{Automaton, IntoStreamer, Set, SetBuilder, Streamer};
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sorted word set stored as a memory-mapped FST.
pub struct Dictionary {
    set: Set<Mmap>,
}

impl Dictionary {
    /// Loads the installed dictionary for `language`, bootstrapping a small
    /// built-in word list on first use.
    pub fn load(language: &str) -> Result<Self> {
        let dict_path = Self::path_for(language)?;

        if !dict_path.exists() {
            info!("No {} dictionary installed, creating a basic one", language);
            Self::build_from_words(&basic_wordlist(), &dict_path)?;
        }

        Self::load_from_path(&dict_path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            GecError::Dictionary(format!("failed to open {}: {}", path.display(), e))
        })?;

        // SAFETY: the file is only read, and dictionaries are replaced by
        // writing a new file rather than editing one in place.
        let mmap = unsafe { Mmap::map(&file)? };
        let set = Set::new(mmap).map_err(|e| {
            GecError::Dictionary(format!("failed to parse {}: {}", path.display(), e))
        })?;

        debug!("Loaded {} words from {}", set.len(), path.display());
        Ok(Self { set })
    }

    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut results = Vec::new();
        let mut stream = self
            .set
            .search(fst::automaton::Str::new(prefix).starts_with())
            .into_stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                results.push(word);
            }
        }

        results
    }

    /// Words whose length is within one of `len`. Walks the whole set.
    pub fn words_near_length(&self, len: usize, limit: usize) -> Vec<String> {
        let mut results = Vec::new();
        let mut stream = self.set.stream();

        while let Some(key) = stream.next() {
            if key.len().abs_diff(len) <= 1 {
                if let Ok(word) = String::from_utf8(key.to_vec()) {
                    results.push(word);
                    if results.len() >= limit {
                        break;
                    }
                }
            }
        }

        results
    }

    /// Writes `words` as an FST set. Input order and duplicates do not matter.
    pub fn build_from_words(words: &[String], output_path: &Path) -> Result<()> {
        let mut sorted_words: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        sorted_words.sort();
        sorted_words.dedup();

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(output_path)?);
        let mut builder = SetBuilder::new(writer)
            .map_err(|e| GecError::Dictionary(format!("failed to create FST builder: {}", e)))?;

        for word in sorted_words {
            builder
                .insert(word.as_bytes())
                .map_err(|e| GecError::Dictionary(format!("failed to insert {:?}: {}", word, e)))?;
        }

        builder
            .finish()
            .map_err(|e| GecError::Dictionary(format!("failed to finalize dictionary: {}", e)))
    }

    pub fn path_for(language: &str) -> Result<PathBuf> {
        let data_dir = crate::config::Config::data_dir()
            .ok_or_else(|| GecError::Dictionary("no data directory available".into()))?;
        Ok(data_dir.join(format!("{}.dict", language)))
    }
}

fn basic_wordlist() -> Vec<String> {
    [
        "the", "be", "to", "of", "and", "a", "in", "that", "have", "i", "it", "for", "not", "on",
        "with", "he", "as", "you", "do", "at", "this", "but", "his", "by", "from", "they", "we",
        "say", "her", "she", "or", "an", "will", "my", "one", "all", "would", "there", "their",
        "what", "so", "up", "out", "if", "about", "who", "get", "which", "go", "me", "when",
        "make", "can", "like", "time", "no", "just", "him", "know", "take", "people", "into",
        "year", "your", "good", "some", "could", "them", "see", "other", "than", "then", "now",
        "look", "only", "come", "its", "over", "think", "also", "back", "after", "use", "two",
        "how", "our", "work", "first", "well", "way", "even", "new", "want", "because", "any",
        "these", "give", "day", "most", "us", "is", "are", "was", "were", "has", "had", "cat",
        "dog", "sat", "happy", "hello", "world", "text", "sentence", "word", "write", "read",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
