use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{GameError, Result};

const DEFAULT_EPSILON: f64 = 1e-8;
const DEFAULT_CLIP_OBS: f64 = 10.0;

/// Running-mean statistics the policy was trained against, frozen for inference.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationStats {
    pub mean: Vec<f32>,
    pub var: Vec<f32>,
    pub epsilon: f64,
    pub clip_obs: f64,
}

#[derive(Deserialize)]
struct Moments {
    mean: Vec<f32>,
    var: Vec<f32>,
}

/// 两种格式: {"obs_rms": {"mean", "var"}} 或者顶层 {"mean", "var"}
#[derive(Deserialize)]
struct RawStats {
    obs_rms: Option<Moments>,
    mean: Option<Vec<f32>>,
    var: Option<Vec<f32>>,
    epsilon: Option<f64>,
    clip_obs: Option<f64>,
}

impl NormalizationStats {
    pub fn new(mean: Vec<f32>, var: Vec<f32>) -> Result<Self> {
        if mean.len() != var.len() {
            return Err(GameError::Configuration(format!(
                "mean has {} entries but var has {}",
                mean.len(),
                var.len()
            )));
        }
        Ok(Self {
            mean,
            var,
            epsilon: DEFAULT_EPSILON,
            clip_obs: DEFAULT_CLIP_OBS,
        })
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_clip_obs(mut self, clip_obs: f64) -> Self {
        self.clip_obs = clip_obs;
        self
    }

    /// Parses either the nested (`obs_rms`) or the flat stats layout.
    ///
    /// Only a missing `epsilon` or `clip_obs` takes its default. An explicit
    /// `epsilon: 0` is kept as zero, and `clip_obs <= 0` is rejected rather than
    /// replaced. Malformed JSON is a `Json` error; well-formed JSON with missing or
    /// mistyped fields is a `Configuration` error.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let stats = serde_json::from_str::<serde_json::Value>(json)
            .map_err(GameError::from)
            .and_then(|value| {
                RawStats::deserialize(value)
                    .map_err(|err| GameError::Configuration(format!("normalization stats: {err}")))
            })
            .and_then(Self::from_raw);
        if let Err(err) = &stats {
            tracing::error!(%err, "failed to load normalization statistics");
        }
        stats
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| {
            tracing::error!(path = %path.display(), %err, "cannot read normalization statistics");
            GameError::from(err)
        })?;
        Self::from_json_str(&json)
    }

    fn from_raw(raw: RawStats) -> Result<Self> {
        let (mean, var) = match (raw.obs_rms, raw.mean, raw.var) {
            (Some(nested), _, _) => (nested.mean, nested.var),
            (None, Some(mean), Some(var)) => (mean, var),
            _ => {
                return Err(GameError::Configuration(
                    "stats file in unknown format, expected `mean`/`var` or `obs_rms.mean`/`obs_rms.var`"
                        .to_string(),
                ));
            }
        };

        let stats = Self::new(mean, var)?
            .with_epsilon(raw.epsilon.unwrap_or(DEFAULT_EPSILON))
            .with_clip_obs(raw.clip_obs.unwrap_or(DEFAULT_CLIP_OBS));

        if !(stats.clip_obs.is_finite() && stats.clip_obs > 0.0) || stats.epsilon < 0.0 {
            return Err(GameError::Configuration(format!(
                "clip_obs must be positive and epsilon non-negative (clip_obs={}, epsilon={})",
                stats.clip_obs, stats.epsilon
            )));
        }
        Ok(stats)
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }
}

/// Stateless observation transform applied before every policy call.
#[derive(Debug, Clone)]
pub struct ObservationNormalizer {
    stats: NormalizationStats,
}

impl ObservationNormalizer {
    pub fn new(stats: NormalizationStats) -> Self {
        Self { stats }
    }

    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    /// `(obs - mean) / sqrt(var + epsilon)`, clipped to `[-clip_obs, clip_obs]`.
    ///
    /// Observations longer than the statistics are rejected rather than truncated.
    pub fn normalize(&self, obs: &[f32]) -> Result<Vec<f32>> {
        if obs.len() > self.stats.dim() {
            return Err(GameError::DimensionMismatch {
                expected: self.stats.dim(),
                actual: obs.len(),
            });
        }

        let clip = self.stats.clip_obs;
        let normalized = obs
            .iter()
            .zip(self.stats.mean.iter().zip(self.stats.var.iter()))
            .map(|(&x, (&mean, &var))| {
                let z = (f64::from(x) - f64::from(mean))
                    / (f64::from(var) + self.stats.epsilon).sqrt();
                // 0/0 (零方差且 epsilon = 0) 视为没有偏移
                if z.is_nan() {
                    0.0
                } else {
                    z.max(-clip).min(clip) as f32
                }
            })
            .collect();
        Ok(normalized)
    }
}
