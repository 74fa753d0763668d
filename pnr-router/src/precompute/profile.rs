//! Profile stage: worst-case bounds between candidates.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::VertexId;
use crate::engine::{Limits, MultiTargetTermination, NoHooks, RequestContext, Search};
use crate::graph::{Graph, TraverseOptions};
use crate::spt::MinimumWeight;
use crate::state::State;

/// Upper-bound weights between `seed` and every other target it reaches.
///
/// `options` should charge scheduled edges their time upper bound, so the
/// weights hold for any departure time. For a backward seed the weight of
/// target `t` bounds travel from `t` to the seed; for a forward seed, from
/// the seed to `t`.
pub(super) fn profile(
    graph: &Graph,
    seed: State,
    options: &TraverseOptions,
    limits: Limits,
    targets: &BTreeSet<VertexId>,
) -> BTreeMap<VertexId, f64> {
    let origin = seed.vertex();
    let others = || targets.iter().copied().filter(move |&t| t != origin);

    let mut search = Search::new(MinimumWeight, seed.direction(), options.clone(), limits);
    search.seed(seed, &NoHooks);
    let mut termination = MultiTargetTermination::new(others());
    search.run(graph, &mut termination, &RequestContext::unbounded());

    others()
        .filter_map(|t| {
            search
                .spt()
                .states_at(t)
                .map(|(_, s)| s.weight())
                .min_by(f64::total_cmp)
                .map(|w| (t, w))
        })
        .collect()
}
