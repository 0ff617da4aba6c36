use crate::checker::dictionary::Dictionary;
use dashmap::DashMap;

/// Largest edit distance a suggestion may have from the misspelled word.
const MAX_DISTANCE: usize = 2;

/// Caches suggestion lists per lowercase word. Shared across threads.
pub struct Suggester {
    max_suggestions: usize,
    cache: DashMap<String, Vec<String>>,
}

impl Suggester {
    pub fn new(max_suggestions: usize) -> Self {
        Self {
            max_suggestions,
            cache: DashMap::new(),
        }
    }

    pub fn suggest(&self, word: &str, dictionary: &Dictionary) -> Vec<String> {
        if self.max_suggestions == 0 {
            return Vec::new();
        }
        let key = word.to_lowercase();
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        let suggestions = generate(&key, dictionary, self.max_suggestions);
        self.cache.insert(key, suggestions.clone());
        suggestions
    }
}

/// Ranks dictionary words by edit distance to `word`, cheapest sources
/// first: single-edit variants, then shared prefixes, then (for short words
/// only) a bounded scan of similar-length words.
pub fn generate(word: &str, dictionary: &Dictionary, max_suggestions: usize) -> Vec<String> {
    let mut ranked: Vec<(usize, String)> = Vec::new();
    let push = |ranked: &mut Vec<(usize, String)>, candidate: String| {
        if candidate == word || ranked.iter().any(|(_, w)| *w == candidate) {
            return;
        }
        let distance = edit_distance(word, &candidate);
        if distance <= MAX_DISTANCE {
            ranked.push((distance, candidate));
        }
    };

    for variant in single_edits(word) {
        if dictionary.contains(&variant) {
            push(&mut ranked, variant);
        }
    }

    let chars: Vec<char> = word.chars().collect();
    for prefix_len in [3, 2] {
        if ranked.len() >= max_suggestions || chars.len() < prefix_len {
            continue;
        }
        let prefix: String = chars[..prefix_len].iter().collect();
        for candidate in dictionary.words_with_prefix(&prefix) {
            push(&mut ranked, candidate);
        }
    }

    if ranked.len() < max_suggestions && chars.len() <= 3 {
        for candidate in dictionary.words_near_length(chars.len(), 100) {
            push(&mut ranked, candidate);
        }
    }

    ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    ranked
        .into_iter()
        .take(max_suggestions)
        .map(|(_, w)| w)
        .collect()
}

/// Levenshtein distance over chars, two rows at a time.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != *b_char);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Deletions, adjacent swaps and a few common letter confusions.
fn single_edits(word: &str) -> Vec<String> {
    const CONFUSIONS: [(char, char); 11] = [
        ('a', 'e'),
        ('e', 'i'),
        ('i', 'o'),
        ('o', 'u'),
        ('b', 'v'),
        ('c', 'k'),
        ('f', 'v'),
        ('g', 'j'),
        ('m', 'n'),
        ('s', 'z'),
        ('t', 'd'),
    ];

    let chars: Vec<char> = word.chars().collect();
    let mut edits = Vec::new();

    for i in 0..chars.len() {
        let mut variant = chars.clone();
        variant.remove(i);
        edits.push(variant.into_iter().collect());
    }

    for i in 0..chars.len().saturating_sub(1) {
        let mut variant = chars.clone();
        variant.swap(i, i + 1);
        edits.push(variant.into_iter().collect());
    }

    for (i, &ch) in chars.iter().enumerate() {
        for &(from, to) in &CONFUSIONS {
            let swapped = if ch == from {
                Some(to)
            } else if ch == to {
                Some(from)
            } else {
                None
            };
            if let Some(replacement) = swapped {
                let mut variant = chars.clone();
                variant[i] = replacement;
                edits.push(variant.into_iter().collect());
            }
        }
    }

    edits
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn dictionary(words: &[&str]) -> (tempfile::TempDir, Dictionary) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words.dict");
        let words: Vec<String> = words.iter().map(|s| s.to_string()).collect();
        Dictionary::build_from_words(&words, &path).unwrap();
        let dict = Dictionary::load_from_path(&path).unwrap();
        (dir, dict)
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("hello", "hello"), 0);
        assert_eq!(edit_distance("hello", "hallo"), 1);
        assert_eq!(edit_distance("teh", "the"), 2);
        assert_eq!(edit_distance("hello", "world"), 4);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("café", "cafe"), 1);
    }

    #[test]
    fn test_single_edits() {
        let edits = single_edits("hello");
        assert!(edits.contains(&"hllo".to_string()));
        assert!(edits.contains(&"ehllo".to_string()));
        assert!(edits.contains(&"hallo".to_string()));
    }

    #[test]
    fn test_generate_ranks_by_distance() {
        let (_dir, dict) = dictionary(&["the", "then", "tea", "house"]);
        let suggestions = generate("teh", &dict, 5);
        assert_eq!(suggestions[0], "tea");
        assert!(suggestions.contains(&"the".to_string()));
        assert!(!suggestions.contains(&"house".to_string()));
    }

    #[test]
    fn test_suggester_caches_and_limits() {
        let (_dir, dict) = dictionary(&["cat", "car", "cart", "can"]);
        let suggester = Suggester::new(2);
        let first = suggester.suggest("Cst", &dict);
        assert_eq!(first.len(), 2);
        assert_eq!(suggester.suggest("cst", &dict), first);
        assert_eq!(suggester.cache.len(), 1);
    }
}
