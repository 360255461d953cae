use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::Rng;

use crate::cluster::vectorize::{SparseVector, sparse_dot};

/// Mini-batch k-means over sparse TF-IDF rows with dense centroids.
///
/// Runs `n_init` independent seeded initializations and keeps the fit with
/// the lowest inertia. Fixed seeds make every fit reproducible.
#[derive(Debug, Clone)]
pub(crate) struct MiniBatchKMeans {
    pub n_clusters: usize,
    pub batch_size: usize,
    pub n_init: usize,
    pub max_iter: usize,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct KMeansModel {
    pub centroids: Vec<Vec<f32>>,
    pub labels: Vec<u32>,
    pub inertia: f64,
}

impl KMeansModel {
    pub fn distinct_labels(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        for &label in &self.labels {
            seen.insert(label);
        }
        seen.len()
    }
}

fn densify(row: &SparseVector, dim: usize) -> Vec<f32> {
    let mut dense = vec![0.0f32; dim];
    for &(index, weight) in row {
        dense[index as usize] = weight;
    }
    dense
}

fn row_norm_sq(row: &SparseVector) -> f32 {
    row.iter().map(|&(_, w)| w * w).sum()
}

fn dense_sparse_dot(centroid: &[f32], row: &SparseVector) -> f32 {
    row.iter().map(|&(index, weight)| centroid[index as usize] * weight).sum()
}

fn nearest(centroids: &[Vec<f32>], centroid_norms: &[f32], row: &SparseVector) -> (usize, f64) {
    let x_norm = row_norm_sq(row);
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let dist = f64::from(centroid_norms[c]) - 2.0 * f64::from(dense_sparse_dot(centroid, row))
            + f64::from(x_norm);
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    (best, best_dist.max(0.0))
}

impl MiniBatchKMeans {
    pub fn fit(&self, rows: &[SparseVector], dim: usize) -> KMeansModel {
        let mut best: Option<KMeansModel> = None;
        for init in 0..self.n_init {
            let model = self.fit_once(rows, dim, self.seed.wrapping_add(init as u64));
            if best.as_ref().is_none_or(|b| model.inertia < b.inertia) {
                best = Some(model);
            }
        }
        best.unwrap_or(KMeansModel { centroids: Vec::new(), labels: Vec::new(), inertia: 0.0 })
    }

    fn fit_once(&self, rows: &[SparseVector], dim: usize, seed: u64) -> KMeansModel {
        let n = rows.len();
        let k = self.n_clusters.min(n);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut centroids = kmeanspp_init(rows, dim, k, &mut rng);
        let mut centroid_norms: Vec<f32> =
            centroids.iter().map(|c| c.iter().map(|v| v * v).sum()).collect();
        let mut counts = vec![0u64; k];

        for _ in 0..self.max_iter {
            for _ in 0..self.batch_size.min(n) {
                let i = rng.random_range(0..n);
                let (c, _) = nearest(&centroids, &centroid_norms, &rows[i]);

                // Sculley-style per-sample learning rate 1/v_c.
                counts[c] += 1;
                let eta = 1.0 / counts[c] as f32;
                let scale = 1.0 - eta;
                for value in centroids[c].iter_mut() {
                    *value *= scale;
                }
                centroid_norms[c] *= scale * scale;
                for &(index, weight) in &rows[i] {
                    let step = eta * weight;
                    let current = centroids[c][index as usize];
                    centroid_norms[c] += 2.0 * current * step + step * step;
                    centroids[c][index as usize] = current + step;
                }
            }
        }

        let mut labels = Vec::with_capacity(n);
        let mut inertia = 0.0;
        for row in rows {
            let (c, dist) = nearest(&centroids, &centroid_norms, row);
            labels.push(c as u32);
            inertia += dist;
        }

        KMeansModel { centroids, labels, inertia }
    }
}

/// k-means++ seeding: each further centroid is drawn with probability
/// proportional to its squared distance from the nearest one chosen so far.
fn kmeanspp_init(rows: &[SparseVector], dim: usize, k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let n = rows.len();
    let first = rng.random_range(0..n);
    let mut centroids = vec![densify(&rows[first], dim)];

    let dist_sq = |centroid: &[f32], row: &SparseVector| -> f64 {
        let c_norm: f32 = centroid.iter().map(|v| v * v).sum();
        let dist = f64::from(c_norm) - 2.0 * f64::from(dense_sparse_dot(centroid, row))
            + f64::from(row_norm_sq(row));
        dist.max(0.0)
    };

    let mut min_dist: Vec<f64> = rows
        .iter()
        .map(|row| dist_sq(&centroids[0], row))
        .collect();

    while centroids.len() < k {
        let total: f64 = min_dist.iter().sum();
        let next = if total > 0.0 {
            let target = rng.random_range(0.0..total);
            let mut cumulative = 0.0;
            let mut picked = n - 1;
            for (i, &d) in min_dist.iter().enumerate() {
                cumulative += d;
                if cumulative >= target {
                    picked = i;
                    break;
                }
            }
            picked
        } else {
            // all points coincide with an existing centroid
            rng.random_range(0..n)
        };

        let centroid = densify(&rows[next], dim);
        for (i, row) in rows.iter().enumerate() {
            let d = dist_sq(&centroid, row);
            if d < min_dist[i] {
                min_dist[i] = d;
            }
        }
        centroids.push(centroid);
    }

    centroids
}

/// Mean silhouette coefficient over a bounded, seeded sample.
///
/// Distances are Euclidean over the normalized TF-IDF rows. Points whose
/// cluster has no other sampled member contribute 0, matching the usual
/// convention for singleton clusters.
pub(crate) fn silhouette_score(
    rows: &[SparseVector],
    labels: &[u32],
    sample_cap: usize,
    seed: u64,
) -> f64 {
    let n = rows.len();
    if n == 0 {
        return 0.0;
    }

    let indices: Vec<usize> = if n <= sample_cap {
        (0..n).collect()
    } else {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sampled = rand::seq::index::sample(&mut rng, n, sample_cap).into_vec();
        sampled.sort_unstable();
        sampled
    };

    let k = labels.iter().copied().max().unwrap_or(0) as usize + 1;
    let distance = |a: usize, b: usize| -> f64 {
        let na = f64::from(row_norm_sq(&rows[a]));
        let nb = f64::from(row_norm_sq(&rows[b]));
        let dot = f64::from(sparse_dot(&rows[a], &rows[b]));
        (na + nb - 2.0 * dot).max(0.0).sqrt()
    };

    let mut total = 0.0;
    for &i in &indices {
        let mut sums = vec![0.0f64; k];
        let mut counts = vec![0u32; k];
        for &j in &indices {
            if i == j {
                continue;
            }
            let cluster = labels[j] as usize;
            sums[cluster] += distance(i, j);
            counts[cluster] += 1;
        }

        let own = labels[i] as usize;
        if counts[own] == 0 {
            continue; // singleton in sample, contributes 0
        }
        let a = sums[own] / f64::from(counts[own]);
        let b = (0..k)
            .filter(|&c| c != own && counts[c] > 0)
            .map(|c| sums[c] / f64::from(counts[c]))
            .fold(f64::INFINITY, f64::min);
        if !b.is_finite() {
            continue;
        }
        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }

    total / indices.len() as f64
}
