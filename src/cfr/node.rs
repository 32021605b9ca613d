//! Per-information-set regret and strategy tables.
//!
//! A [`Node`] accumulates counterfactual regret and weighted strategy mass
//! for one information set and derives two distributions from them: the
//! *current* strategy via regret matching, and the *average* strategy via
//! normalization of the accumulated mass. The average strategy is what
//! converges to a Nash equilibrium.

/// Regret and strategy state for a single information set.
///
/// Both derived strategies are memoized. The current strategy is only
/// recomputed by [`update_strategy`](Node::update_strategy), so callers
/// control when a traversal starts reading refreshed probabilities. The
/// average strategy recomputes lazily and is invalidated whenever strategy
/// mass is accumulated.
#[derive(Debug, Clone)]
pub struct Node {
    /// Cumulative counterfactual regret per action. May be negative.
    regret_sum: Vec<f64>,
    /// Cumulative weighted strategy mass per action. Never decreases.
    strategy_sum: Vec<f64>,
    current_strategy: Vec<f64>,
    average_strategy: Vec<f64>,
    average_valid: bool,
    strategy_stale: bool,
}

impl Node {
    /// Create a node for an information set with `action_num` legal actions.
    ///
    /// The current strategy starts uniform; regrets and strategy mass start
    /// at zero.
    pub fn new(action_num: usize) -> Self {
        Self {
            regret_sum: vec![0.0; action_num],
            strategy_sum: vec![0.0; action_num],
            current_strategy: vec![1.0 / action_num as f64; action_num],
            average_strategy: vec![0.0; action_num],
            average_valid: false,
            strategy_stale: false,
        }
    }

    /// Number of actions at this information set.
    pub fn action_num(&self) -> usize {
        self.regret_sum.len()
    }

    /// The current strategy, as last computed by
    /// [`update_strategy`](Node::update_strategy).
    pub fn strategy(&self) -> &[f64] {
        &self.current_strategy
    }

    /// The average strategy: the normalization of the accumulated strategy
    /// mass, recomputed on demand.
    ///
    /// When no mass has been accumulated yet the normalizing sum is zero and
    /// the distribution falls back to uniform.
    pub fn average_strategy(&mut self) -> &[f64] {
        if !self.average_valid {
            self.calc_average_strategy();
        }
        &self.average_strategy
    }

    /// Add `weight * strategy[a]` into the accumulated strategy mass and
    /// invalidate the memoized average.
    pub fn accumulate_strategy(&mut self, strategy: &[f64], weight: f64) {
        for (sum, &probability) in self.strategy_sum.iter_mut().zip(strategy) {
            *sum += weight * probability;
        }
        self.average_valid = false;
    }

    /// Recompute the current strategy from the cumulative regrets.
    ///
    /// Regret matching: each action's probability is its positive regret
    /// divided by the sum of positive regrets; if no regret is positive the
    /// strategy is uniform. A no-op when no regret changed since the last
    /// call, so repeated calls are idempotent.
    pub fn update_strategy(&mut self) {
        if !self.strategy_stale {
            return;
        }
        let mut normalizing_sum = 0.0;
        for (current, &regret) in self.current_strategy.iter_mut().zip(&self.regret_sum) {
            *current = regret.max(0.0);
            normalizing_sum += *current;
        }
        let action_num = self.current_strategy.len();
        for current in &mut self.current_strategy {
            if normalizing_sum > 0.0 {
                *current /= normalizing_sum;
            } else {
                *current = 1.0 / action_num as f64;
            }
        }
        self.strategy_stale = false;
    }

    /// Cumulative regret for one action.
    pub fn regret(&self, action: usize) -> f64 {
        self.regret_sum[action]
    }

    /// Overwrite the cumulative regret for one action and mark the current
    /// strategy as needing recomputation.
    pub fn set_regret(&mut self, action: usize, value: f64) {
        self.regret_sum[action] = value;
        self.strategy_stale = true;
    }

    fn calc_average_strategy(&mut self) {
        let normalizing_sum: f64 = self.strategy_sum.iter().sum();
        let action_num = self.strategy_sum.len();
        for (average, &sum) in self.average_strategy.iter_mut().zip(&self.strategy_sum) {
            if normalizing_sum > 0.0 {
                *average = sum / normalizing_sum;
            } else {
                *average = 1.0 / action_num as f64;
            }
        }
        self.average_valid = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_distribution(strategy: &[f64]) {
        let sum: f64 = strategy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "strategy sums to {}", sum);
        for &p in strategy {
            assert!((0.0..=1.0).contains(&p), "probability {} out of range", p);
        }
    }

    #[test]
    fn test_new_node_is_uniform() {
        let node = Node::new(3);
        assert_eq!(node.action_num(), 3);
        assert_eq!(node.strategy(), &[1.0 / 3.0; 3]);
        assert_distribution(node.strategy());
    }

    #[test]
    fn test_regret_matching_positive_regrets() {
        let mut node = Node::new(2);
        node.set_regret(0, 1.0);
        node.set_regret(1, 3.0);
        node.update_strategy();
        assert_eq!(node.strategy(), &[0.25, 0.75]);
        assert_distribution(node.strategy());
    }

    #[test]
    fn test_regret_matching_clips_negative_regret() {
        let mut node = Node::new(2);
        node.set_regret(0, -1.0);
        node.set_regret(1, 3.0);
        node.update_strategy();
        assert_eq!(node.strategy(), &[0.0, 1.0]);
    }

    #[test]
    fn test_uniform_fallback_when_no_positive_regret() {
        let mut node = Node::new(3);
        node.set_regret(0, -2.0);
        node.set_regret(1, 0.0);
        node.set_regret(2, -0.5);
        node.update_strategy();
        assert_eq!(node.strategy(), &[1.0 / 3.0; 3]);
    }

    #[test]
    fn test_zero_regrets_stay_uniform() {
        let mut node = Node::new(3);
        node.set_regret(1, 0.0);
        node.update_strategy();
        assert_eq!(node.strategy(), &[1.0 / 3.0; 3]);
    }

    #[test]
    fn test_update_strategy_is_idempotent() {
        let mut node = Node::new(3);
        node.set_regret(0, 0.7);
        node.set_regret(2, 2.1);
        node.update_strategy();
        let first: Vec<f64> = node.strategy().to_vec();
        node.update_strategy();
        assert_eq!(node.strategy(), first.as_slice());
    }

    #[test]
    fn test_set_regret_invalidates_current_strategy() {
        let mut node = Node::new(2);
        node.set_regret(0, 1.0);
        node.update_strategy();
        assert_eq!(node.strategy(), &[1.0, 0.0]);
        node.set_regret(1, 3.0);
        node.update_strategy();
        assert_eq!(node.strategy(), &[0.25, 0.75]);
    }

    #[test]
    fn test_average_strategy_normalizes_accumulated_mass() {
        let mut node = Node::new(2);
        node.accumulate_strategy(&[0.5, 0.5], 1.0);
        node.accumulate_strategy(&[1.0, 0.0], 3.0);
        let average = node.average_strategy();
        assert_eq!(average, &[3.5 / 4.0, 0.5 / 4.0]);
        assert_distribution(average);
    }

    #[test]
    fn test_average_cache_invalidation() {
        let mut node = Node::new(2);
        node.accumulate_strategy(&[1.0, 0.0], 1.0);
        assert_eq!(node.average_strategy(), &[1.0, 0.0]);
        node.accumulate_strategy(&[0.0, 1.0], 1.0);
        assert_eq!(node.average_strategy(), &[0.5, 0.5]);
    }

    #[test]
    fn test_average_strategy_uniform_before_any_accumulation() {
        let mut node = Node::new(3);
        assert_eq!(node.average_strategy(), &[1.0 / 3.0; 3]);
    }
}
