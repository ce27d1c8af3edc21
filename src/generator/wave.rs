use bitvec::{bitvec, vec::BitVec};
use ndarray::{Array, Ix3};

use crate::grid::{
    direction::{CARTESIAN_2D_DIRECTIONS, DIRECTIONS_COUNT},
    NodeIndex,
};

use super::{pattern::PatternIndex, rules::Rules};

/// A pending ban to propagate to the neighbours of `node_index`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PropagationEntry {
    pub(crate) node_index: NodeIndex,
    pub(crate) pattern_index: PatternIndex,
}

/// Entropy data of a node, updated on each ban
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct NodeEntropyData {
    /// Shannon entropy of the node
    pub(crate) entropy: f64,
    /// Sum of the weights of the patterns still possible on the node
    pub(crate) weight_sum: f64,
    /// Sum of `weight * ln(weight)` of the patterns still possible on the node
    pub(crate) weight_log_weight_sum: f64,
}

impl NodeEntropyData {
    fn new(weight_sum: f64, weight_log_weight_sum: f64) -> Self {
        Self {
            entropy: entropy(weight_sum, weight_log_weight_sum),
            weight_sum,
            weight_log_weight_sum,
        }
    }

    /// Removes the contribution of a pattern without recomputing the entropy from all the remaining patterns
    #[inline]
    fn remove(&mut self, weight: f64, weight_log_weight: f64) {
        self.entropy += self.weight_log_weight_sum / self.weight_sum - f64::ln(self.weight_sum);
        self.weight_sum -= weight;
        self.weight_log_weight_sum -= weight_log_weight;
        self.entropy -= self.weight_log_weight_sum / self.weight_sum - f64::ln(self.weight_sum);
    }
}

#[inline]
fn entropy(weight_sum: f64, weight_log_weight_sum: f64) -> f64 {
    f64::ln(weight_sum) - weight_log_weight_sum / weight_sum
}

/// Superposition state of every node of the output.
pub(crate) struct WaveState {
    patterns_count: usize,
    /// `coefficients[node_index * patterns_count + pattern_index]` is true (1) if `pattern_index` is still possible on `node_index`
    coefficients: BitVec<usize>,
    /// Stores how many patterns are still possible for a given node
    possible_patterns_counts: Vec<usize>,
    entropies: Vec<NodeEntropyData>,
    initial_entropy_data: NodeEntropyData,
    /// The value at `supports_count[node_index][pattern_index][direction]` represents the number of supports of `pattern_index` at `node_index` from `direction`
    supports_count: Array<usize, Ix3>,
    /// Stack of bans to propagate. Each (node, pattern) can only be banned once, so `nodes * patterns` entries are enough.
    propagation_stack: Vec<PropagationEntry>,
    stack_size: usize,
}

impl WaveState {
    /// Allocates a wave with every pattern possible on every node.
    ///
    /// Support counters are left at `0` until the first [`WaveState::clear`].
    pub(crate) fn new(rules: &Rules, nodes_count: usize) -> Self {
        let patterns_count = rules.patterns_count();
        let (mut weight_sum, mut weight_log_weight_sum) = (0., 0.);
        for pattern in 0..patterns_count {
            weight_sum += rules.weight(pattern);
            weight_log_weight_sum += rules.weight_log_weight(pattern);
        }
        let initial_entropy_data = NodeEntropyData::new(weight_sum, weight_log_weight_sum);

        Self {
            patterns_count,
            coefficients: bitvec![1; nodes_count * patterns_count],
            possible_patterns_counts: vec![patterns_count; nodes_count],
            entropies: vec![initial_entropy_data; nodes_count],
            initial_entropy_data,
            supports_count: Array::zeros((nodes_count, patterns_count, DIRECTIONS_COUNT)),
            propagation_stack: vec![PropagationEntry::default(); nodes_count * patterns_count],
            stack_size: 0,
        }
    }

    /// Resets every node to the full superposition.
    pub(crate) fn clear(&mut self, rules: &Rules) {
        self.coefficients.fill(true);
        self.possible_patterns_counts.fill(self.patterns_count);
        self.entropies.fill(self.initial_entropy_data);
        self.stack_size = 0;

        // The support count for a pattern "from" a direction is the count of patterns allowed next to it when looking in the opposite direction.
        let nodes_count = self.possible_patterns_counts.len();
        for pattern in 0..self.patterns_count {
            for &direction in CARTESIAN_2D_DIRECTIONS {
                let supports = rules.allowed_patterns(pattern, direction.opposite()).len();
                for node in 0..nodes_count {
                    self.supports_count[(node, pattern, direction as usize)] = supports;
                }
            }
        }
    }

    #[inline]
    pub(crate) fn nodes_count(&self) -> usize {
        self.possible_patterns_counts.len()
    }

    #[inline]
    pub(crate) fn possible_patterns_count(&self, node_index: NodeIndex) -> usize {
        self.possible_patterns_counts[node_index]
    }

    #[inline]
    pub(crate) fn entropy_data(&self, node_index: NodeIndex) -> &NodeEntropyData {
        &self.entropies[node_index]
    }

    /// Returns the patterns still possible on `node_index`
    pub(crate) fn possible_patterns(
        &self,
        node_index: NodeIndex,
    ) -> impl Iterator<Item = PatternIndex> + '_ {
        self.coefficients
            [node_index * self.patterns_count..(node_index + 1) * self.patterns_count]
            .iter_ones()
    }

    /// Returns the first pattern still possible on `node_index`, if any
    #[inline]
    pub(crate) fn first_possible(&self, node_index: NodeIndex) -> Option<PatternIndex> {
        self.coefficients
            [node_index * self.patterns_count..(node_index + 1) * self.patterns_count]
            .first_one()
    }

    #[inline]
    pub(crate) fn supports(
        &mut self,
        node_index: NodeIndex,
        pattern: PatternIndex,
        direction: usize,
    ) -> &mut usize {
        &mut self.supports_count[(node_index, pattern, direction)]
    }

    /// Marks `pattern` as impossible on `node_index` and enqueues the ban for propagation.
    ///
    /// Returns `false` and leaves the state untouched if the pattern was already banned.
    pub(crate) fn ban(&mut self, rules: &Rules, node_index: NodeIndex, pattern: PatternIndex) -> bool {
        let bit = node_index * self.patterns_count + pattern;
        if !self.coefficients[bit] {
            return false;
        }
        self.coefficients.set(bit, false);

        for direction in 0..DIRECTIONS_COUNT {
            self.supports_count[(node_index, pattern, direction)] = 0;
        }

        self.propagation_stack[self.stack_size] = PropagationEntry {
            node_index,
            pattern_index: pattern,
        };
        self.stack_size += 1;

        self.possible_patterns_counts[node_index] -= 1;
        self.entropies[node_index].remove(rules.weight(pattern), rules.weight_log_weight(pattern));
        true
    }

    #[inline]
    pub(crate) fn pop_propagation(&mut self) -> Option<PropagationEntry> {
        if self.stack_size == 0 {
            return None;
        }
        self.stack_size -= 1;
        Some(self.propagation_stack[self.stack_size])
    }

    #[cfg(test)]
    pub(crate) fn pending_propagations(&self) -> usize {
        self.stack_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{pattern::PatternCatalog, sample::Sample};

    fn rules() -> Rules {
        let sample = Sample::from_rows(&[&[1, 1, 2], &[1, 3, 3], &[2, 2, 1]]);
        Rules::new(PatternCatalog::new(&sample, 1, true, 1).unwrap())
    }

    fn weight_sum_from_scratch(wave: &WaveState, rules: &Rules, node: NodeIndex) -> f64 {
        wave.possible_patterns(node).map(|p| rules.weight(p)).sum()
    }

    fn entropy_from_scratch(wave: &WaveState, rules: &Rules, node: NodeIndex) -> f64 {
        let weight_sum = weight_sum_from_scratch(wave, rules, node);
        let wlw_sum: f64 = wave
            .possible_patterns(node)
            .map(|p| rules.weight_log_weight(p))
            .sum();
        entropy(weight_sum, wlw_sum)
    }

    #[test]
    fn initial_state() {
        let rules = rules();
        let wave = WaveState::new(&rules, 6);
        assert_eq!(rules.patterns_count(), 3);
        for node in 0..6 {
            assert_eq!(wave.possible_patterns_count(node), 3);
            assert_eq!(wave.entropy_data(node).weight_sum, 9.);
        }
        assert_eq!(wave.pending_propagations(), 0);
    }

    #[test]
    fn aggregates_follow_bans() {
        let rules = rules();
        let mut wave = WaveState::new(&rules, 4);
        assert!(wave.ban(&rules, 2, 1));
        let data = *wave.entropy_data(2);
        assert!((data.weight_sum - weight_sum_from_scratch(&wave, &rules, 2)).abs() < 1e-9);
        assert!((data.entropy - entropy_from_scratch(&wave, &rules, 2)).abs() < 1e-9);
        assert_eq!(wave.possible_patterns_count(2), 2);
        assert_eq!(wave.possible_patterns(2).collect::<Vec<_>>(), vec![0, 2]);

        assert!(wave.ban(&rules, 2, 0));
        let data = *wave.entropy_data(2);
        assert!((data.weight_sum - rules.weight(2)).abs() < 1e-9);
        assert!(data.entropy.abs() < 1e-9);
        assert_eq!(wave.first_possible(2), Some(2));
    }

    #[test]
    fn double_ban_is_a_no_op() {
        let rules = rules();
        let mut wave = WaveState::new(&rules, 4);
        assert!(wave.ban(&rules, 1, 2));
        let data = *wave.entropy_data(1);
        assert!(!wave.ban(&rules, 1, 2));
        assert_eq!(*wave.entropy_data(1), data);
        assert_eq!(wave.possible_patterns_count(1), 2);
        assert_eq!(wave.pending_propagations(), 1);
        assert_eq!(
            wave.pop_propagation(),
            Some(PropagationEntry {
                node_index: 1,
                pattern_index: 2
            })
        );
        assert_eq!(wave.pop_propagation(), None);
    }

    #[test]
    fn supports_are_set_on_clear_only() {
        let rules = rules();
        let mut wave = WaveState::new(&rules, 2);
        assert_eq!(*wave.supports(1, 2, 3), 0);
        wave.clear(&rules);
        assert_eq!(*wave.supports(1, 2, 3), 3);
    }

    #[test]
    fn ban_zeroes_supports() {
        let rules = rules();
        let mut wave = WaveState::new(&rules, 2);
        wave.clear(&rules);
        assert_eq!(*wave.supports(0, 0, 0), 3);
        wave.ban(&rules, 0, 0);
        for direction in 0..DIRECTIONS_COUNT {
            assert_eq!(*wave.supports(0, 0, direction), 0);
        }
    }

    #[test]
    fn clear_restores_full_superposition() {
        let rules = rules();
        let mut wave = WaveState::new(&rules, 2);
        wave.ban(&rules, 0, 0);
        wave.ban(&rules, 0, 1);
        wave.clear(&rules);
        assert_eq!(wave.possible_patterns_count(0), 3);
        assert_eq!(wave.pending_propagations(), 0);
        assert_eq!(*wave.supports(0, 0, 1), 3);
        assert_eq!(wave.first_possible(0), Some(0));
    }
}
