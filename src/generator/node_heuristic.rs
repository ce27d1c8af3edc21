use rand::Rng;

use crate::grid::{GridDefinition, NodeIndex};

use super::{boundary::BoundaryPolicy, wave::WaveState};

/// Maximum noise added to a node entropy so that nodes with the same entropy are picked in a random order rather than in scan order.
const MAX_NOISE_VALUE: f64 = 1E-6;
/// Any node entropy is lower than this starting minimum
const INITIAL_MIN_ENTROPY: f64 = 1E+3;

/// Outcome of the scan of the nodes of a wave
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeSelection {
    /// An observable node has no possible pattern left
    Contradiction(NodeIndex),
    /// Every observable node has a single possible pattern
    AllDecided,
    /// The observable node with the minimum entropy
    Selected(NodeIndex),
}

/// Picks the observable node with the minimum (noised) entropy among the nodes that still have more than one possible pattern.
pub(crate) fn select_node<R: Rng>(
    wave: &WaveState,
    grid: &GridDefinition,
    boundary: &BoundaryPolicy,
    rng: &mut R,
) -> NodeSelection {
    let mut min = INITIAL_MIN_ENTROPY;
    let mut picked_node = None;
    for node_index in 0..wave.nodes_count() {
        if !boundary.is_observable(grid, node_index) {
            continue;
        }
        let possibilities_count = wave.possible_patterns_count(node_index);
        if possibilities_count == 0 {
            return NodeSelection::Contradiction(node_index);
        }
        let entropy = wave.entropy_data(node_index).entropy;
        if possibilities_count > 1 && entropy <= min {
            let noise = MAX_NOISE_VALUE * rng.gen::<f64>();
            if entropy + noise < min {
                min = entropy + noise;
                picked_node = Some(node_index);
            }
        }
    }
    match picked_node {
        Some(node_index) => NodeSelection::Selected(node_index),
        None => NodeSelection::AllDecided,
    }
}

/// Picks an index in `weights` with a probability proportional to its weight, from a single uniform draw `r` in `[0, 1)`.
///
/// Weights are accumulated in order and the first index with a non-null weight whose cumulative normalized weight reaches `r` is returned. When all the weights are null, every index is equally likely.
///
/// ### Example
///
/// ```
/// use ghx_overlap_gen::generator::node_heuristic::weighted_index;
///
/// let weights = [1., 0., 3.];
/// assert_eq!(weighted_index(&weights, 0.1), 0);
/// assert_eq!(weighted_index(&weights, 0.3), 2);
/// ```
pub fn weighted_index(weights: &[f64], r: f64) -> usize {
    if weights.is_empty() {
        return 0;
    }
    let sum: f64 = weights.iter().sum();
    if sum == 0. {
        return ((r * weights.len() as f64) as usize).min(weights.len() - 1);
    }
    let mut cumulative = 0.;
    for (index, &weight) in weights.iter().enumerate() {
        if weight <= 0. {
            continue;
        }
        cumulative += weight / sum;
        if r <= cumulative {
            return index;
        }
    }
    // Rounding may leave the total slightly below 1
    weights.iter().rposition(|&weight| weight > 0.).unwrap_or(0)
}
