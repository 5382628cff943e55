use goap_core::{ActionSpec, FactSet, Plan};

#[derive(Debug, Clone, Copy)]
pub struct PlannerConfig {
    /// Upper bound on search-tree node expansions. A search that overruns
    /// the budget reports no plan rather than a possibly non-minimal one.
    pub max_expansions: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_expansions: 4096,
        }
    }
}

/// Exhaustive branch-and-bound search for the cheapest action sequence that
/// carries `start` into a state satisfying `goal`.
///
/// An action may be used at most once along any one path. This keeps the
/// enumeration finite without depth bookkeeping, at the price of ruling out
/// plans that legitimately repeat an action; callers that need repetition
/// must model it as distinct specs.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the cheapest plan, `None` when no usable-action ordering
    /// reaches the goal. Equal-cost candidates resolve to the one discovered
    /// first, and discovery order follows `actions` order, so results are
    /// stable across runs.
    ///
    /// The goal is tested only on states derived by applying an action, so a
    /// returned plan always contains at least one step, even from a start
    /// state that already satisfies the goal. Callers for whom "nothing to
    /// do" is an answer should test `start.satisfies(goal)` themselves.
    ///
    /// `actions` is expected to be pre-filtered to what the agent can
    /// currently attempt; the search itself only consults the declarative
    /// precondition and effect fact-sets.
    pub fn plan(&self, actions: &[ActionSpec], start: &FactSet, goal: &FactSet) -> Option<Plan> {
        let mut search = Search {
            actions,
            goal,
            arena: vec![Node {
                state: start.clone(),
                cost: 0.0,
                action: None,
                parent: None,
            }],
            best_leaf: None,
            expansions: 0,
            max_expansions: self.config.max_expansions,
            overran_budget: false,
        };

        let mut remaining = vec![true; actions.len()];
        search.expand(0, &mut remaining);

        if search.overran_budget {
            return None;
        }

        let (leaf, _) = search.best_leaf?;
        Some(search.reconstruct(leaf))
    }
}

struct Node {
    state: FactSet,
    cost: f64,
    action: Option<usize>,
    parent: Option<usize>,
}

struct Search<'a> {
    actions: &'a [ActionSpec],
    goal: &'a FactSet,
    arena: Vec<Node>,
    best_leaf: Option<(usize, f64)>,
    expansions: usize,
    max_expansions: usize,
    overran_budget: bool,
}

impl Search<'_> {
    /// Depth-first enumeration. `remaining[i]` marks whether action `i` may
    /// still be used on the current path; flags are restored on backtrack so
    /// sibling branches see the full set.
    fn expand(&mut self, node: usize, remaining: &mut [bool]) {
        self.expansions += 1;
        if self.expansions > self.max_expansions {
            self.overran_budget = true;
            return;
        }

        for idx in 0..self.actions.len() {
            if self.overran_budget {
                return;
            }
            if !remaining[idx] {
                continue;
            }

            let action = &self.actions[idx];
            if !action.applicable_in(&self.arena[node].state) {
                continue;
            }

            let child_cost = self.arena[node].cost + action.cost();
            if let Some((_, best)) = self.best_leaf {
                // Bound: this branch can only get more expensive.
                if child_cost >= best {
                    continue;
                }
            }

            let child_state = action.apply_to(&self.arena[node].state);
            let child = self.arena.len();
            let satisfied = child_state.satisfies(self.goal);
            self.arena.push(Node {
                state: child_state,
                cost: child_cost,
                action: Some(idx),
                parent: Some(node),
            });

            if satisfied {
                // Strict `<` above means the first leaf found at a given
                // cost is the one kept.
                self.best_leaf = Some((child, child_cost));
            } else {
                remaining[idx] = false;
                self.expand(child, remaining);
                remaining[idx] = true;
            }
        }
    }

    fn reconstruct(&self, leaf: usize) -> Plan {
        let mut steps = Vec::new();
        let mut cursor = Some(leaf);
        while let Some(idx) = cursor {
            let node = &self.arena[idx];
            if let Some(action_idx) = node.action {
                steps.push(self.actions[action_idx].clone());
            }
            cursor = node.parent;
        }
        steps.reverse();
        Plan::new(steps)
    }
}
