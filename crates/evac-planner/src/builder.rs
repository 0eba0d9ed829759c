//! Fluent builder for constructing a [`RoutePlanner`].

use evac_regions::{FuzzyResolver, IndelRatio, Similarity};
use evac_spatial::Router;

use crate::{PlannerConfig, PlanResult, RoutePlanner};

/// Fluent builder for [`RoutePlanner<R, S>`].
///
/// # Required inputs
///
/// - `R: Router`: the routing algorithm (e.g. [`evac_spatial::DijkstraRouter`])
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                     |
/// |---------------------|-----------------------------|
/// | `.config(c)`        | `PlannerConfig::default()`  |
/// | `.similarity(s)`    | [`IndelRatio`]              |
///
/// # Example
///
/// ```rust,ignore
/// let planner = RoutePlannerBuilder::new(DijkstraRouter)
///     .config(config)
///     .build()?;
/// let plan = planner.compute_routes(&snapshot, "andheri", &RouteOptions::default())?;
/// ```
pub struct RoutePlannerBuilder<R: Router, S: Similarity = IndelRatio> {
    config:     Option<PlannerConfig>,
    router:     R,
    similarity: S,
}

impl<R: Router> RoutePlannerBuilder<R, IndelRatio> {
    pub fn new(router: R) -> Self {
        Self {
            config:     None,
            router,
            similarity: IndelRatio,
        }
    }
}

impl<R: Router, S: Similarity> RoutePlannerBuilder<R, S> {
    /// Supply planner settings.  Checked by [`build`](Self::build).
    pub fn config(mut self, config: PlannerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the place-name similarity metric.  The resolver's exact and
    /// containment rules still apply on top of it.
    pub fn similarity<S2: Similarity>(self, similarity: S2) -> RoutePlannerBuilder<R, S2> {
        RoutePlannerBuilder {
            config: self.config,
            router: self.router,
            similarity,
        }
    }

    /// Validate the configuration and return a ready planner.
    pub fn build(self) -> PlanResult<RoutePlanner<R, S>> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(RoutePlanner {
            config,
            router:   self.router,
            resolver: FuzzyResolver::with_similarity(self.similarity),
        })
    }
}
