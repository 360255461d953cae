mod kmeans;
mod preprocess;
mod stopwords;
mod vectorize;

use anyhow::Result;
use skillmine_store::RelationStore;
use skillmine_types::{
    ClusterSummary, ClusteredPrompt, EXAMPLE_PROMPT_LEN, PromptRecord, Source, truncate,
};
use std::collections::BTreeSet;

use kmeans::{MiniBatchKMeans, silhouette_score};
use preprocess::{MIN_PROCESSED_LEN, PLACEHOLDER_TOKENS, preprocess};
use vectorize::{TfidfMatrix, TfidfOptions, fit_transform};

/// Fixed seed so repeated runs over the same corpus produce identical
/// clusters.
const RANDOM_SEED: u64 = 42;

/// Silhouette is computed on at most this many sampled rows.
const SILHOUETTE_SAMPLE_CAP: usize = 5000;

/// Below this many usable prompts, model fitting is skipped entirely.
const MIN_CLUSTER_INPUT: usize = 5;

const MAX_EXAMPLE_PROMPTS: usize = 5;
const MAX_TOP_TERMS: usize = 10;
const MAX_LABEL_TERMS: usize = 4;

#[derive(Debug, Clone)]
pub struct ClusterOutcome {
    /// Summaries sorted by member count, descending.
    pub clusters: Vec<ClusterSummary>,
    /// Parallel to the input prompts; `None` where the text was filtered out.
    pub assignments: Vec<Option<u32>>,
}

/// Phase 2a: cluster the prompts relation and persist cluster summaries plus
/// the prompts-with-assignment relation.
pub fn run_prompt_clustering(store: &RelationStore) -> Result<Vec<ClusterSummary>> {
    let prompts = store.read_prompts()?;
    let outcome = cluster_prompts(&prompts);

    let clustered: Vec<ClusteredPrompt> = prompts
        .into_iter()
        .zip(outcome.assignments.iter())
        .map(|(prompt, &cluster_id)| ClusteredPrompt { prompt, cluster_id })
        .collect();

    store.write_clusters(&outcome.clusters)?;
    store.write_clustered_prompts(&clustered)?;
    Ok(outcome.clusters)
}

/// Cluster prompt texts by TF-IDF similarity with automatic cluster-count
/// selection.
pub fn cluster_prompts(prompts: &[PromptRecord]) -> ClusterOutcome {
    if prompts.is_empty() {
        return ClusterOutcome { clusters: Vec::new(), assignments: Vec::new() };
    }

    let processed: Vec<String> = prompts.iter().map(|p| preprocess(&p.text)).collect();
    let valid_indices: Vec<usize> = processed
        .iter()
        .enumerate()
        .filter(|(_, text)| text.chars().count() > MIN_PROCESSED_LEN)
        .map(|(i, _)| i)
        .collect();

    if valid_indices.len() < MIN_CLUSTER_INPUT {
        return catch_all_outcome(prompts, &valid_indices);
    }

    let valid_texts: Vec<String> =
        valid_indices.iter().map(|&i| processed[i].clone()).collect();
    let matrix = fit_transform(&valid_texts, &TfidfOptions::default());

    let candidates: Vec<usize> = candidate_ks(valid_texts.len())
        .into_iter()
        .filter(|&k| k < valid_texts.len())
        .collect();

    let mut best_k = candidates.first().copied().unwrap_or(MIN_CLUSTER_INPUT);
    let mut best_score = f64::NEG_INFINITY;
    for &k in &candidates {
        let model = fit_kmeans(&matrix, k);
        // a k that collapses to one cluster is skipped, not an error
        if model.distinct_labels() > 1 {
            let score =
                silhouette_score(&matrix.rows, &model.labels, SILHOUETTE_SAMPLE_CAP, RANDOM_SEED);
            if score > best_score {
                best_score = score;
                best_k = k;
            }
        }
    }

    // Deterministic refit at the winning k.
    let model = fit_kmeans(&matrix, best_k);

    let mut assignments: Vec<Option<u32>> = vec![None; prompts.len()];
    for (valid_pos, &original) in valid_indices.iter().enumerate() {
        assignments[original] = Some(model.labels[valid_pos]);
    }

    let mut clusters = Vec::new();
    for cluster_id in 0..best_k as u32 {
        let members: Vec<usize> = valid_indices
            .iter()
            .enumerate()
            .filter(|&(valid_pos, _)| model.labels[valid_pos] == cluster_id)
            .map(|(_, &original)| original)
            .collect();
        if members.is_empty() {
            continue;
        }

        let top_terms = top_centroid_terms(&matrix, &model.centroids[cluster_id as usize]);
        clusters.push(ClusterSummary {
            cluster_id,
            label: label_from_terms(&top_terms),
            count: members.len() as u32,
            example_prompts: example_prompts(prompts, &members),
            top_terms,
            sources: distinct_sources(prompts, &members),
        });
    }

    clusters.sort_by(|a, b| b.count.cmp(&a.count).then(a.cluster_id.cmp(&b.cluster_id)));

    ClusterOutcome { clusters, assignments }
}

fn fit_kmeans(matrix: &TfidfMatrix, k: usize) -> kmeans::KMeansModel {
    MiniBatchKMeans {
        n_clusters: k,
        batch_size: 256,
        n_init: 3,
        max_iter: 100,
        seed: RANDOM_SEED,
    }
    .fit(&matrix.rows, matrix.dim())
}

/// Candidate cluster counts scale with corpus size.
fn candidate_ks(n_samples: usize) -> Vec<usize> {
    if n_samples < 50 {
        vec![3, 5, 8]
    } else if n_samples < 200 {
        vec![5, 10, 15, 20]
    } else if n_samples < 1000 {
        vec![10, 20, 30, 40]
    } else {
        vec![20, 30, 40, 50, 60]
    }
}

/// Too few usable prompts: one catch-all cluster, no model fit.
fn catch_all_outcome(prompts: &[PromptRecord], valid_indices: &[usize]) -> ClusterOutcome {
    let mut assignments: Vec<Option<u32>> = vec![None; prompts.len()];
    for &i in valid_indices {
        assignments[i] = Some(0);
    }

    let all_indices: Vec<usize> = (0..prompts.len()).collect();
    let clusters = vec![ClusterSummary {
        cluster_id: 0,
        label: "all prompts".to_string(),
        count: valid_indices.len() as u32,
        example_prompts: example_prompts(prompts, valid_indices),
        top_terms: Vec::new(),
        sources: distinct_sources(prompts, &all_indices),
    }];

    ClusterOutcome { clusters, assignments }
}

fn example_prompts(prompts: &[PromptRecord], members: &[usize]) -> Vec<String> {
    members
        .iter()
        .take(MAX_EXAMPLE_PROMPTS)
        .map(|&i| truncate(&prompts[i].text, EXAMPLE_PROMPT_LEN))
        .collect()
}

fn distinct_sources(prompts: &[PromptRecord], members: &[usize]) -> Vec<Source> {
    let sources: BTreeSet<Source> = members.iter().map(|&i| prompts[i].source).collect();
    sources.into_iter().collect()
}

/// Highest-weight centroid terms, ties broken by vocabulary order.
fn top_centroid_terms(matrix: &TfidfMatrix, centroid: &[f32]) -> Vec<String> {
    let mut weighted: Vec<(usize, f32)> = centroid
        .iter()
        .enumerate()
        .filter(|&(_, &w)| w > 0.0)
        .map(|(i, &w)| (i, w))
        .collect();
    weighted.sort_by(|a, b| {
        b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0))
    });
    weighted
        .into_iter()
        .take(MAX_TOP_TERMS)
        .map(|(i, _)| matrix.vocab[i].clone())
        .collect()
}

/// Join the top non-placeholder terms; "misc" when nothing survives.
fn label_from_terms(terms: &[String]) -> String {
    let filtered: Vec<&str> = terms
        .iter()
        .map(String::as_str)
        .filter(|term| !PLACEHOLDER_TOKENS.contains(term))
        .take(MAX_LABEL_TERMS)
        .collect();
    if filtered.is_empty() {
        "misc".to_string()
    } else {
        filtered.join(" / ")
    }
}
