//! Splits allowed themes into weak / mid / strong buckets by score.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::domain::models::NEUTRAL_MEAN;

/// Share of themes placed in each of the weak and strong buckets.
pub const EDGE_FRACTION: f64 = 0.3;

/// Skill bucket a theme falls into for one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Weak,
    Mid,
    Strong,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weak => "weak",
            Self::Mid => "mid",
            Self::Strong => "strong",
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of partitioning a theme list.
///
/// `weak` and `strong` overlap only when there are fewer themes than the two
/// edge buckets need (a single theme is both weakest and strongest).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThemeBuckets {
    pub weak: Vec<String>,
    pub mid: Vec<String>,
    pub strong: Vec<String>,
}

impl ThemeBuckets {
    pub fn get(&self, bucket: Bucket) -> &[String] {
        match bucket {
            Bucket::Weak => &self.weak,
            Bucket::Mid => &self.mid,
            Bucket::Strong => &self.strong,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.weak.is_empty() && self.mid.is_empty() && self.strong.is_empty()
    }
}

pub struct BucketPartitioner;

impl BucketPartitioner {
    /// Size of each edge bucket for `n` themes: `max(1, round(0.3 * n))`.
    pub fn edge_size(n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let size = (EDGE_FRACTION * n as f64).round_ties_even() as usize;
        size.clamp(1, n)
    }

    /// Partition `themes` by ascending mean.
    ///
    /// Themes missing from `means` rank as [`NEUTRAL_MEAN`]. Ties keep the
    /// input order. Duplicate names are collapsed to their first occurrence.
    pub fn partition<S: AsRef<str>>(themes: &[S], means: &HashMap<String, f64>) -> ThemeBuckets {
        let mut seen = HashSet::new();
        let mut ranked: Vec<(&str, f64)> = themes
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| seen.insert(*t))
            .map(|t| (t, means.get(t).copied().unwrap_or(NEUTRAL_MEAN)))
            .collect();

        if ranked.is_empty() {
            return ThemeBuckets::default();
        }

        // sort_by is stable
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        let names: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();

        let n = names.len();
        let edge = Self::edge_size(n);
        let weak = names[..edge].to_vec();
        let strong = names[n - edge..].to_vec();
        let mid = if 2 * edge < n {
            names[edge..n - edge].to_vec()
        } else {
            Vec::new()
        };

        ThemeBuckets { weak, mid, strong }
    }
}
