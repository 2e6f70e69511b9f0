//! The collision solver and its caching protocol.
//!
//! ```text
//! // once per outer step
//! solver.cached_apply(range, colliders, dt, true);
//! // every further relaxation iteration
//! solver.cached_apply(range, colliders, dt, false);
//! ```
//!
//! A generate call resolves every enabled collider exactly and records
//! the contacts of the cached categories as planes. Reuse calls resolve
//! only the uncached categories exactly and replay the planes for the
//! rest. `direct_apply` resolves everything exactly on every call.

use std::sync::Arc;

use weft_collider::{BatchQueryResult, ColliderInstance};
use weft_types::WeftResult;

use crate::ccd::apply_ccd;
use crate::config::SolverConfig;
use crate::debug::ContactSink;
use crate::dispatch::{apply_complex, apply_simple, PassContext};
use crate::particles::ParticleRange;
use crate::planar::{apply_planar_constraints, PlanarConstraint, PlanarConstraintCache, PlanarPass};
use crate::report::{CollisionReport, ContactTally};

/// Which collider categories a discrete pass resolves and records.
#[derive(Clone, Copy)]
struct CategoryPlan {
    simple: bool,
    complex: bool,
    record_simple: bool,
    record_complex: bool,
}

/// Position-based collision solver for one particle system.
pub struct SoftBodyCollisionSolver {
    config: SolverConfig,
    cache: PlanarConstraintCache,
    batch: BatchQueryResult,
    sink: Option<Arc<dyn ContactSink>>,
    generated: bool,
}

impl SoftBodyCollisionSolver {
    /// Creates a solver after validating `config`.
    pub fn new(config: SolverConfig) -> WeftResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cache: PlanarConstraintCache::new(),
            batch: BatchQueryResult::default(),
            sink: None,
            generated: false,
        })
    }

    /// Installs a sink that receives every resolved contact.
    pub fn with_contact_sink(mut self, sink: Arc<dyn ContactSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Replaces the configuration. The plane cache is invalidated.
    pub fn set_config(&mut self, config: SolverConfig) -> WeftResult<()> {
        config.validate()?;
        self.config = config;
        self.cache.reset(0);
        self.generated = false;
        Ok(())
    }

    pub fn cache(&self) -> &PlanarConstraintCache {
        &self.cache
    }

    /// Dense plane list from the last generate pass.
    pub fn planar_constraints(&self) -> &[PlanarConstraint] {
        self.cache.constraints()
    }

    fn context(&self, dt: f32) -> PassContext<'_> {
        PassContext {
            config: &self.config,
            dt,
            sink: self.sink.as_deref(),
        }
    }

    /// Resolves all contacts exactly. Uses swept queries when CCD is on.
    pub fn direct_apply(
        &mut self,
        mut range: ParticleRange<'_>,
        colliders: &[ColliderInstance],
        dt: f32,
    ) -> CollisionReport {
        debug_assert!(dt > 0.0, "timestep must be positive");
        let tally = if self.config.use_ccd {
            apply_ccd(&self.context(dt), &mut range, colliders)
        } else {
            let plan = CategoryPlan {
                simple: self.config.enable_simple_colliders,
                complex: self.config.enable_complex_colliders,
                record_simple: false,
                record_complex: false,
            };
            self.discrete(&mut range, colliders, dt, plan)
        };
        self.finish("direct", range.len(), colliders.len(), tally)
    }

    /// Generate-then-reuse collision resolution.
    ///
    /// Call with `generate = true` once per outer step before any call
    /// with `generate = false`. CCD bypasses the cache entirely.
    pub fn cached_apply(
        &mut self,
        mut range: ParticleRange<'_>,
        colliders: &[ColliderInstance],
        dt: f32,
        generate: bool,
    ) -> CollisionReport {
        debug_assert!(dt > 0.0, "timestep must be positive");
        if self.config.use_ccd {
            let tally = apply_ccd(&self.context(dt), &mut range, colliders);
            return self.finish("ccd", range.len(), colliders.len(), tally);
        }

        let cfg = &self.config;
        let cache_simple = cfg.use_planar_constraint_for_simple_colliders;
        let cache_complex = cfg.use_planar_constraint_for_complex_colliders;

        if generate {
            self.cache.reset(range.len());
            let plan = CategoryPlan {
                simple: cfg.enable_simple_colliders,
                complex: cfg.enable_complex_colliders,
                record_simple: cache_simple,
                record_complex: cache_complex,
            };
            let tally = self.discrete(&mut range, colliders, dt, plan);
            self.cache.compact();
            self.generated = true;
            return self.finish("generate", range.len(), colliders.len(), tally);
        }

        if !self.generated {
            tracing::warn!("cached_apply(generate = false) called before any generate pass; replaying an empty plane list");
        }
        let plan = CategoryPlan {
            simple: cfg.enable_simple_colliders && !cache_simple,
            complex: cfg.enable_complex_colliders && !cache_complex,
            record_simple: false,
            record_complex: false,
        };
        let exact = self.discrete(&mut range, colliders, dt, plan);

        let pass = PlanarPass {
            friction: self.config.friction_enabled().then_some(self.config.friction_coefficient),
            dt,
            parallel: &self.config.parallel,
            sink: self.sink.as_deref(),
        };
        let planar = apply_planar_constraints(&pass, range.x, range.p, range.inv_m, self.cache.constraints());
        self.finish("reuse", range.len(), colliders.len(), exact.merge(planar))
    }

    /// Replays a plane list against `range` without touching the cache.
    ///
    /// `constraints` must be sorted by particle with unique indices, as
    /// [`PlanarConstraintCache::compact`] produces them.
    pub fn apply_planar(
        &self,
        range: ParticleRange<'_>,
        constraints: &[PlanarConstraint],
        dt: f32,
    ) -> CollisionReport {
        debug_assert!(dt > 0.0, "timestep must be positive");
        let pass = PlanarPass {
            friction: self.config.friction_enabled().then_some(self.config.friction_coefficient),
            dt,
            parallel: &self.config.parallel,
            sink: self.sink.as_deref(),
        };
        let tally = apply_planar_constraints(&pass, range.x, range.p, range.inv_m, constraints);
        tracing::debug!(
            mode = "planar",
            particles = range.len(),
            constraints = constraints.len(),
            contacts = tally.contacts,
            "collision_solve"
        );
        CollisionReport {
            contacts: tally.contacts,
            max_penetration: tally.max_penetration,
            planar_constraints: constraints.len(),
        }
    }

    fn discrete(
        &mut self,
        range: &mut ParticleRange<'_>,
        colliders: &[ColliderInstance],
        dt: f32,
        plan: CategoryPlan,
    ) -> ContactTally {
        let ctx = PassContext {
            config: &self.config,
            dt,
            sink: self.sink.as_deref(),
        };
        let mut tally = ContactTally::default();
        if plan.simple {
            let slots = plan.record_simple.then(|| self.cache.slots_mut());
            tally = tally.merge(apply_simple(&ctx, range, colliders, slots));
        }
        if plan.complex {
            let slots = plan.record_complex.then(|| self.cache.slots_mut());
            tally = tally.merge(apply_complex(&ctx, range, colliders, &mut self.batch, slots));
        }
        tally
    }

    fn finish(&self, mode: &str, particles: usize, colliders: usize, tally: ContactTally) -> CollisionReport {
        let report = CollisionReport {
            contacts: tally.contacts,
            max_penetration: tally.max_penetration,
            planar_constraints: self.cache.len(),
        };
        tracing::debug!(
            mode,
            particles,
            colliders,
            contacts = report.contacts,
            max_penetration = report.max_penetration,
            planar_constraints = report.planar_constraints,
            "collision_solve"
        );
        report
    }
}
