use std::collections::HashMap;

use crate::cluster::stopwords::is_stop_word;

/// Sparse TF-IDF row: (vocabulary index, weight), sorted by index,
/// L2-normalized.
pub(crate) type SparseVector = Vec<(u32, f32)>;

#[derive(Debug, Clone)]
pub(crate) struct TfidfOptions {
    pub max_features: usize,
    pub ngram_min: usize,
    pub ngram_max: usize,
    /// Terms in fewer documents are dropped.
    pub min_df: usize,
    /// Terms in a larger fraction of documents are dropped.
    pub max_df: f64,
}

impl Default for TfidfOptions {
    fn default() -> Self {
        Self {
            max_features: 5000,
            ngram_min: 1,
            ngram_max: 3,
            min_df: 2,
            max_df: 0.8,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TfidfMatrix {
    /// Alphabetically sorted vocabulary.
    pub vocab: Vec<String>,
    pub rows: Vec<SparseVector>,
}

impl TfidfMatrix {
    pub fn dim(&self) -> usize {
        self.vocab.len()
    }
}

/// Word tokens of length >= 2, stop words removed.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|token| token.chars().count() >= 2)
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

fn term_counts(tokens: &[String], options: &TfidfOptions) -> HashMap<String, u32> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for n in options.ngram_min..=options.ngram_max {
        if tokens.len() < n {
            break;
        }
        for window in tokens.windows(n) {
            *counts.entry(window.join(" ")).or_insert(0) += 1;
        }
    }
    counts
}

/// Fit a TF-IDF model over the corpus and transform it in one pass.
///
/// Vocabulary selection mirrors the usual vectorizer behavior: document
/// frequency bounds first, then a corpus-frequency cap, then alphabetical
/// index assignment. Smoothed idf; rows are L2-normalized.
pub(crate) fn fit_transform(texts: &[String], options: &TfidfOptions) -> TfidfMatrix {
    let n_docs = texts.len();
    let doc_counts: Vec<HashMap<String, u32>> =
        texts.iter().map(|t| term_counts(&tokenize(t), options)).collect();

    let mut df: HashMap<&str, u32> = HashMap::new();
    let mut corpus_freq: HashMap<&str, u64> = HashMap::new();
    for counts in &doc_counts {
        for (term, count) in counts {
            *df.entry(term.as_str()).or_insert(0) += 1;
            *corpus_freq.entry(term.as_str()).or_insert(0) += u64::from(*count);
        }
    }

    let max_df_count = (options.max_df * n_docs as f64).floor() as u32;
    let mut kept: Vec<&str> = df
        .iter()
        .filter(|&(_, &count)| count >= options.min_df as u32 && count <= max_df_count)
        .map(|(&term, _)| term)
        .collect();

    if kept.len() > options.max_features {
        kept.sort_by(|a, b| {
            corpus_freq
                .get(b)
                .cmp(&corpus_freq.get(a))
                .then_with(|| a.cmp(b))
        });
        kept.truncate(options.max_features);
    }
    kept.sort_unstable();

    let vocab: Vec<String> = kept.iter().map(|t| t.to_string()).collect();
    let index: HashMap<&str, u32> = kept
        .iter()
        .enumerate()
        .map(|(i, &term)| (term, i as u32))
        .collect();

    let idf: Vec<f32> = vocab
        .iter()
        .map(|term| {
            let term_df = df.get(term.as_str()).copied().unwrap_or(0) as f64;
            (((1.0 + n_docs as f64) / (1.0 + term_df)).ln() + 1.0) as f32
        })
        .collect();

    let rows = doc_counts
        .iter()
        .map(|counts| {
            let mut row: SparseVector = counts
                .iter()
                .filter_map(|(term, &count)| {
                    index
                        .get(term.as_str())
                        .map(|&i| (i, count as f32 * idf[i as usize]))
                })
                .collect();
            row.sort_unstable_by_key(|&(i, _)| i);
            let norm = row.iter().map(|&(_, w)| f64::from(w) * f64::from(w)).sum::<f64>().sqrt();
            if norm > 0.0 {
                for entry in &mut row {
                    entry.1 = (f64::from(entry.1) / norm) as f32;
                }
            }
            row
        })
        .collect();

    TfidfMatrix { vocab, rows }
}

/// Dot product of two sorted sparse vectors.
pub(crate) fn sparse_dot(a: &SparseVector, b: &SparseVector) -> f32 {
    let mut result = 0.0f32;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                result += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    result
}
