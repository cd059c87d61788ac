//! Randomized choice of the next question's theme and difficulty.
//!
//! Strong themes are favoured so the player mostly sees material they are
//! good at, with regular detours into average and weak themes:
//!
//! | draw          | bucket | difficulty                |
//! |---------------|--------|---------------------------|
//! | `[0.0, 0.5)`  | strong | hard                      |
//! | `[0.5, 0.8)`  | mid    | uniform easy/medium/hard  |
//! | `[0.8, 1.0)`  | weak   | easy                      |

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use super::bucket_partitioner::{Bucket, ThemeBuckets};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Difficulty;

pub const STRONG_PROBABILITY: f64 = 0.5;
pub const MID_PROBABILITY: f64 = 0.3;

/// Theme and difficulty chosen for one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionParameters {
    pub theme: String,
    pub difficulty: Difficulty,
    /// Bucket drawn before any fallback.
    pub bucket: Bucket,
}

pub struct SelectionPolicy;

impl SelectionPolicy {
    /// Map a uniform draw in `[0, 1)` to a bucket.
    pub fn bucket_for_draw(draw: f64) -> Bucket {
        if draw < STRONG_PROBABILITY {
            Bucket::Strong
        } else if draw < STRONG_PROBABILITY + MID_PROBABILITY {
            Bucket::Mid
        } else {
            Bucket::Weak
        }
    }

    pub fn choose_bucket<R: Rng + ?Sized>(rng: &mut R) -> Bucket {
        Self::bucket_for_draw(rng.gen::<f64>())
    }

    pub fn choose_difficulty<R: Rng + ?Sized>(bucket: Bucket, rng: &mut R) -> Difficulty {
        match bucket {
            Bucket::Strong => Difficulty::Hard,
            Bucket::Weak => Difficulty::Easy,
            Bucket::Mid => Difficulty::ALL[rng.gen_range(0..Difficulty::ALL.len())],
        }
    }

    /// Themes to draw from for `bucket`.
    ///
    /// An empty bucket falls back to `mid`, then to every allowed theme.
    pub fn resolve_themes<'a>(
        bucket: Bucket,
        buckets: &'a ThemeBuckets,
        allowed: &'a [String],
    ) -> &'a [String] {
        let chosen = buckets.get(bucket);
        if !chosen.is_empty() {
            chosen
        } else if !buckets.mid.is_empty() {
            &buckets.mid
        } else {
            allowed
        }
    }

    pub fn pick_theme<R: Rng + ?Sized>(themes: &[String], rng: &mut R) -> DomainResult<String> {
        themes.choose(rng).cloned().ok_or(DomainError::EmptyThemeSet)
    }

    /// Draw bucket, difficulty and theme in one go.
    pub fn select<R: Rng + ?Sized>(
        buckets: &ThemeBuckets,
        allowed: &[String],
        rng: &mut R,
    ) -> DomainResult<QuestionParameters> {
        if allowed.is_empty() {
            return Err(DomainError::EmptyThemeSet);
        }

        let bucket = Self::choose_bucket(rng);
        let difficulty = Self::choose_difficulty(bucket, rng);
        let theme = Self::pick_theme(Self::resolve_themes(bucket, buckets, allowed), rng)?;

        Ok(QuestionParameters {
            theme,
            difficulty,
            bucket,
        })
    }
}
