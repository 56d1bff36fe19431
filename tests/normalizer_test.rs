use cargame::GameError;
use cargame::normalizer::{NormalizationStats, ObservationNormalizer};

fn unit_stats() -> NormalizationStats {
    NormalizationStats::new(vec![0.0; 3], vec![1.0; 3]).unwrap()
}

#[test]
fn zero_observation_with_unit_stats_is_zero() {
    let normalizer = ObservationNormalizer::new(unit_stats().with_epsilon(0.0));
    assert_eq!(normalizer.normalize(&[0.0, 0.0, 0.0]).unwrap(), vec![0.0, 0.0, 0.0]);
}

#[test]
fn applies_mean_and_variance_per_dimension() {
    let stats = NormalizationStats::new(vec![0.5, 0.5, 0.4], vec![0.25, 0.25, 0.04])
        .unwrap()
        .with_epsilon(0.0);
    let out = ObservationNormalizer::new(stats).normalize(&[1.0, 0.0, 0.6]).unwrap();

    let expected = [1.0, -1.0, 1.0];
    for (got, want) in out.iter().zip(expected) {
        assert!((got - want).abs() < 1e-5, "{got} != {want}");
    }
}

#[test]
fn outputs_are_clipped() {
    let normalizer = ObservationNormalizer::new(unit_stats().with_clip_obs(5.0));
    let inputs = [
        [1e6, -1e6, 0.0],
        [f32::MAX, f32::MIN, 4.9],
        [f32::INFINITY, f32::NEG_INFINITY, -7.0],
    ];
    for obs in inputs {
        for value in normalizer.normalize(&obs).unwrap() {
            assert!((-5.0..=5.0).contains(&value), "{value} escaped the clip range");
        }
    }
    assert_eq!(normalizer.normalize(&[1e6, -1e6, 0.0]).unwrap(), vec![5.0, -5.0, 0.0]);
}

#[test]
fn zero_variance_without_epsilon_stays_finite() {
    let stats = NormalizationStats::new(vec![1.0, 1.0], vec![0.0, 0.0])
        .unwrap()
        .with_epsilon(0.0);
    let out = ObservationNormalizer::new(stats).normalize(&[1.0, 2.0]).unwrap();
    assert_eq!(out, vec![0.0, 10.0]);
}

#[test]
fn normalize_is_deterministic() {
    let stats = NormalizationStats::new(vec![0.3, 0.7, 0.1], vec![0.2, 0.2, 0.5]).unwrap();
    let normalizer = ObservationNormalizer::new(stats.clone());
    let obs = [1.0, 0.0, -0.0606];

    let first = normalizer.normalize(&obs).unwrap();
    let second = normalizer.normalize(&obs).unwrap();
    assert_eq!(first, second);
    assert_eq!(normalizer.stats(), &stats);
}

#[test]
fn parses_flat_stats_with_defaults() {
    let stats = NormalizationStats::from_json_str(r#"{"mean": [0.5, 0.5, 0.4], "var": [0.25, 0.25, 0.1]}"#).unwrap();
    assert_eq!(stats.mean, vec![0.5, 0.5, 0.4]);
    assert_eq!(stats.var, vec![0.25, 0.25, 0.1]);
    assert_eq!(stats.epsilon, 1e-8);
    assert_eq!(stats.clip_obs, 10.0);
}

#[test]
fn parses_nested_stats() {
    let json = r#"{
        "obs_rms": {"mean": [0.1, 0.2, 0.3], "var": [1.0, 2.0, 3.0]},
        "epsilon": 1e-6,
        "clip_obs": 5.0
    }"#;
    let stats = NormalizationStats::from_json_str(json).unwrap();
    assert_eq!(stats.mean, vec![0.1, 0.2, 0.3]);
    assert_eq!(stats.var, vec![1.0, 2.0, 3.0]);
    assert_eq!(stats.epsilon, 1e-6);
    assert_eq!(stats.clip_obs, 5.0);
    assert_eq!(stats.dim(), 3);
}

#[test]
fn explicit_zero_epsilon_is_kept() {
    let stats = NormalizationStats::from_json_str(r#"{"mean": [0.0], "var": [1.0], "epsilon": 0.0}"#).unwrap();
    assert_eq!(stats.epsilon, 0.0);
}

#[test]
fn unknown_layout_is_a_configuration_error() {
    for json in [r#"{}"#, r#"{"mean": [0.0]}"#, r#"{"stats": {"mean": [0.0], "var": [1.0]}}"#] {
        let err = NormalizationStats::from_json_str(json).unwrap_err();
        assert!(matches!(err, GameError::Configuration(_)), "{json}: {err}");
    }
}

#[test]
fn mismatched_lengths_are_rejected() {
    let err = NormalizationStats::from_json_str(r#"{"mean": [0.0, 0.0], "var": [1.0]}"#).unwrap_err();
    assert!(matches!(err, GameError::Configuration(_)));
    assert!(NormalizationStats::new(vec![0.0], vec![]).is_err());
}

#[test]
fn non_positive_clip_is_rejected() {
    let err = NormalizationStats::from_json_str(r#"{"mean": [0.0], "var": [1.0], "clip_obs": 0.0}"#).unwrap_err();
    assert!(matches!(err, GameError::Configuration(_)));
}

#[test]
fn malformed_json_is_reported() {
    let err = NormalizationStats::from_json_str("{mean:").unwrap_err();
    assert!(matches!(err, GameError::Json(_)));
}

#[test]
fn incomplete_or_mistyped_fields_are_configuration_errors() {
    // nested layout without its variance
    let err = NormalizationStats::from_json_str(r#"{"obs_rms": {"mean": [0, 0, 0]}}"#).unwrap_err();
    assert!(matches!(err, GameError::Configuration(_)), "{err:?}");

    let err = NormalizationStats::from_json_str(r#"{"mean": "x", "var": [1]}"#).unwrap_err();
    assert!(matches!(err, GameError::Configuration(_)), "{err:?}");

    let err = NormalizationStats::from_json_str(r#"{"mean": [0], "var": [1], "epsilon": "small"}"#)
        .unwrap_err();
    assert!(matches!(err, GameError::Configuration(_)), "{err:?}");
}

#[test]
fn observation_longer_than_stats_is_rejected() {
    let stats = NormalizationStats::new(vec![0.0; 2], vec![1.0; 2]).unwrap();
    let normalizer = ObservationNormalizer::new(stats);
    let err = normalizer.normalize(&[0.0, 1.0, 0.5]).unwrap_err();
    assert!(matches!(err, GameError::DimensionMismatch { expected: 2, actual: 3 }));
}

#[test]
fn shorter_observation_keeps_its_length() {
    let normalizer = ObservationNormalizer::new(unit_stats().with_epsilon(0.0));
    assert_eq!(normalizer.normalize(&[2.0, -3.0]).unwrap(), vec![2.0, -3.0]);
    assert!(normalizer.normalize(&[]).unwrap().is_empty());
}

#[test]
fn loads_stats_from_file() {
    let path = std::env::temp_dir().join(format!("cargame-stats-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"obs_rms": {"mean": [0.0, 1.0, 0.5], "var": [1.0, 1.0, 1.0]}}"#).unwrap();
    let stats = NormalizationStats::from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(stats.mean, vec![0.0, 1.0, 0.5]);

    let missing = NormalizationStats::from_path(path.with_extension("missing"));
    assert!(matches!(missing, Err(GameError::Io(_))));
}
