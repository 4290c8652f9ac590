//! Time-sliced net tracing over an instanced library

use std::time::Instant;

use tracing::{debug, info};

use crate::config::TraceConfig;
use crate::geometry::{Point, Transform};
use crate::hierarchy::{Library, PolygonId};
use crate::layer::LayerTable;

use super::clock::{InstantClock, StepClock};
use super::context::{Instance, SearchContext, SearchState};
use super::expand::Expansion;
use super::output::TracedPolygon;
use super::pick::find_seed;

/// Runs picks and trace steps against a shared library
///
/// The tracer itself holds no search state; every call takes the caller's
/// [`SearchContext`]. Cell boundaries are read from the library as they were
/// last computed, so after changing layer visibility call
/// [`Library::refresh_boundaries`] before the next pick.
pub struct NetTracer<'a> {
    library: &'a Library,
    layers: &'a LayerTable,
    config: TraceConfig,
}

impl<'a> NetTracer<'a> {
    pub fn new(library: &'a Library, layers: &'a LayerTable, config: TraceConfig) -> Self {
        Self { library, layers, config }
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Start a new search at a world-space point
    ///
    /// Any previous search state is discarded. Returns true and enters
    /// `Tracing` if a seed polygon was found, otherwise leaves the context
    /// `Idle`. Polygons on a newly shown layer are only found once the
    /// library's boundaries have been refreshed.
    pub fn pick(&self, ctx: &mut SearchContext, at: Point) -> bool {
        ctx.reset();
        ctx.state = SearchState::Picking;

        let Some(seed) = find_seed(self.library, self.layers, at) else {
            debug!("[Trace] Nothing to pick at ({}, {})", at.x, at.y);
            ctx.state = SearchState::Idle;
            return false;
        };

        let mut instance = Instance::default();
        instance.unchecked.insert(seed.polygon);
        ctx.instances.insert(seed.transform, instance);
        ctx.current = Some(seed.transform);
        ctx.seed = Some(seed);
        ctx.state = SearchState::Tracing;

        info!(
            "[Trace] Picked polygon {} of '{}' at ({}, {})",
            seed.polygon.index,
            self.library.cell(seed.polygon.cell).name(),
            at.x,
            at.y
        );
        true
    }

    /// Advance a trace by one budgeted increment
    ///
    /// At least one frontier polygon is expanded per call. The step yields
    /// once the clock reports more than the configured budget; the returned
    /// context resumes exactly where this one stopped. Contexts that are not
    /// tracing are returned unchanged.
    pub fn step<C: StepClock>(&self, mut ctx: SearchContext, clock: &mut C) -> SearchContext {
        if ctx.state != SearchState::Tracing {
            return ctx;
        }

        clock.restart();
        let budget = self.config.step_budget();
        let expansion = Expansion {
            library: self.library,
            layers: self.layers,
            vertical_gap: self.config.vertical_gap,
        };

        let mut expanded = 0usize;
        let mut queued = 0usize;
        while let Some(key) = ctx.current {
            let next = ctx.instances.get_mut(&key).and_then(|inst| {
                let id = inst.unchecked.pop_first()?;
                inst.checked.insert(id);
                Some(id)
            });

            let Some(id) = next else {
                ctx.current = ctx
                    .instances
                    .iter()
                    .find(|(_, inst)| !inst.is_drained())
                    .map(|(k, _)| *k);
                continue;
            };

            if let Some(polygon) = self.library.polygon(id) {
                queued += expansion.expand(polygon, &Transform::from(key), &mut ctx.instances);
            }
            expanded += 1;

            if clock.elapsed() > budget {
                break;
            }
        }

        if ctx.current.is_none() {
            ctx.state = SearchState::Done;
            info!(
                "[Trace] Done: {} polygons in {} instances",
                ctx.checked_count(),
                ctx.instance_count()
            );
        } else {
            debug!(
                "[Trace] Step expanded {} polygons, queued {}, {} pending in {:?}",
                expanded,
                queued,
                ctx.unchecked_count(),
                clock.elapsed()
            );
        }
        ctx
    }

    /// Step with a wall clock until the search leaves `Tracing`
    pub fn run_to_completion(&self, mut ctx: SearchContext) -> SearchContext {
        let start = Instant::now();
        let mut clock = InstantClock::new();
        let mut steps = 0usize;
        while ctx.is_tracing() {
            ctx = self.step(ctx, &mut clock);
            steps += 1;
        }
        debug!("[Trace] Finished after {} steps in {:?}", steps, start.elapsed());
        ctx
    }

    /// World-space copies of every visited polygon, instance by instance
    pub fn current_polygons(&self, ctx: &SearchContext) -> Vec<TracedPolygon> {
        let mut out = Vec::with_capacity(ctx.checked_count());
        for (key, inst) in &ctx.instances {
            let m = Transform::from(*key);
            let mut ids: Vec<PolygonId> = inst.checked.iter().copied().collect();
            ids.sort_unstable();

            for id in ids {
                let Some(polygon) = self.library.polygon(id) else {
                    continue;
                };
                let mut world = polygon.transformed(&m);
                world.orientate();
                out.push(TracedPolygon::from_polygon(&world));
            }
        }
        out
    }
}
