//! Integration tests for weft-types.

use weft_types::constants::{FRICTION_ENABLE_THRESHOLD, SLIP_EPSILON};
use weft_types::{BoneIndex, ColliderId, ParticleId, WeftError};

// ─── ID Tests ──────────────────────────────────────────────────

#[test]
fn particle_id_index() {
    let id = ParticleId(42);
    assert_eq!(id.index(), 42);
}

#[test]
fn collider_and_bone_index() {
    assert_eq!(ColliderId(7).index(), 7);
    assert_eq!(BoneIndex::from(3).index(), 3);
}

#[test]
fn particle_ids_order_by_index() {
    let mut ids = vec![ParticleId(5), ParticleId(1), ParticleId(3)];
    ids.sort();
    assert_eq!(ids, vec![ParticleId(1), ParticleId(3), ParticleId(5)]);
}

#[test]
fn ids_display_with_their_kind() {
    assert_eq!(ParticleId(12).to_string(), "particle#12");
    assert_eq!(ColliderId(0).to_string(), "collider#0");
    assert_eq!(BoneIndex(2).to_string(), "bone#2");
}

#[test]
fn ids_are_serializable() {
    let id = ParticleId(100);
    let json = serde_json::to_string(&id).unwrap();
    let deserialized: ParticleId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, deserialized);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = WeftError::InvalidShape("capsule radius must be positive".into());
    assert!(err.to_string().contains("capsule radius"));
    assert!(err.to_string().starts_with("Invalid shape"));
}

#[test]
fn io_error_converts() {
    fn open_missing() -> weft_types::WeftResult<()> {
        std::fs::read("/definitely/not/here.weft")?;
        Ok(())
    }
    let err = open_missing().unwrap_err();
    assert!(matches!(err, WeftError::Io(_)));
}

// ─── Constant Tests ───────────────────────────────────────────

#[test]
fn thresholds_are_small_and_positive() {
    assert!(FRICTION_ENABLE_THRESHOLD > 0.0 && FRICTION_ENABLE_THRESHOLD < 0.01);
    assert!(SLIP_EPSILON > 0.0 && SLIP_EPSILON < FRICTION_ENABLE_THRESHOLD);
}

// ─── Parallel Config Tests ────────────────────────────────────

#[test]
fn parallel_threshold() {
    let cfg = weft_types::ParallelConfig {
        enabled: true,
        min_batch_size: 64,
    };
    assert!(!cfg.should_parallelize(10));
    assert!(cfg.should_parallelize(64));
    assert!(!weft_types::ParallelConfig::sequential().should_parallelize(1_000_000));
}
