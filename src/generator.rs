use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};

#[cfg(feature = "debug-traces")]
use tracing::{debug, info, trace};

use crate::{
    grid::{direction::CARTESIAN_2D_DIRECTIONS, GridData, GridDefinition, NodeIndex},
    GeneratorError,
};

use self::{
    boundary::BoundaryPolicy,
    builder::{GeneratorBuilder, Unset},
    node_heuristic::{select_node, weighted_index, NodeSelection},
    observer::GenerationUpdate,
    pattern::PatternIndex,
    rules::Rules,
    wave::WaveState,
};

/// Defines the [`BoundaryPolicy`] deciding which nodes are observed and how they are connected
pub mod boundary;
/// Defines a [`GeneratorBuilder`] used to create a generator
pub mod builder;
/// Node selection and pattern selection heuristics
pub mod node_heuristic;
/// Defines different possible observers to view the results: execution of a [`Generator`]
pub mod observer;
/// Defines the [`pattern::PatternCatalog`] extracted from a sample
pub mod pattern;
/// Defines the [`Rules`] used by a [`Generator`]
pub mod rules;
/// Defines the [`sample::Sample`] grid given as input
pub mod sample;
mod wave;

/// Different ways to seed the RNG of the generator.
///
/// Note: No matter the selected mode, on each failed generation/reset, the generator will generate and use a new `u64` seed using the previous `u64` seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RngMode {
    /// The generator will use the given seed for its random source.
    Seeded(u64),
    /// The generator will use a random seed for its random source.
    ///
    /// The randomly generated seed can still be retrieved by calling `seed` on the generator once created.
    RandomSeed,
}

impl RngMode {
    /// `0` selects a random seed, any other value is used as the seed
    pub fn from_seed(seed: u64) -> Self {
        match seed {
            0 => RngMode::RandomSeed,
            seed => RngMode::Seeded(seed),
        }
    }

    fn to_seed(self) -> u64 {
        match self {
            RngMode::Seeded(seed) => seed,
            RngMode::RandomSeed => rand::thread_rng().gen::<u64>(),
        }
    }
}

/// Represents the current generation state, if not failed.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum GenerationStatus {
    /// The generation has not ended yet.
    Ongoing,
    /// The generation ended succesfully. The whole grid is generated.
    Done,
}

/// Lifecycle of the wave of a [`Generator`]
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum GenerationState {
    /// The wave has not been initialized yet, it will be on the next run.
    Init,
    /// Some observable nodes still have more than one possible pattern.
    Ongoing,
    /// Every observable node has exactly one possible pattern.
    Done,
    /// A node has no possible pattern left. Only a reinitialization leaves this state.
    Failed(GeneratorError),
}

/// Information about a generation
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct GenInfo {
    /// How many tries the generation took before succeeding
    pub try_count: u32,
}

/// A node reduced to a single pattern
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridNode {
    /// Index of the node in the [`GridDefinition`]
    pub node_index: NodeIndex,
    /// Pattern left on the node
    pub pattern_index: PatternIndex,
    /// Sample symbol of the top-left pixel of the pattern
    pub symbol: u8,
}

/// Overlapping model WFC generator.
/// Use a [`GeneratorBuilder`] to get an instance of a [`Generator`].
pub struct Generator {
    // === Read-only configuration ===
    grid: GridDefinition,
    rules: Arc<Rules>,
    boundary: BoundaryPolicy,
    /// Pattern pinned on the bottom row, `0` when disabled
    ground: PatternIndex,
    max_retry_count: u32,
    /// Default limit of observations for [`Generator::run_incremental`]
    iterations: u32,

    // === Generation state ===
    seed: u64,
    rng: StdRng,
    /// Seed given to the last `run` call since the last (re)initialization
    run_seed: Option<u64>,
    state: GenerationState,
    wave: WaveState,
    /// Pattern of each node, recorded once the generation is done
    observed: Option<Vec<Option<PatternIndex>>>,
    /// Observers signaled with updates of the nodes.
    observers: Vec<crossbeam_channel::Sender<GenerationUpdate>>,
}

impl Generator {
    /// Returns a new `GeneratorBuilder`
    pub fn builder() -> GeneratorBuilder<Unset> {
        GeneratorBuilder::new()
    }

    pub(crate) fn new(
        rules: Arc<Rules>,
        grid: GridDefinition,
        ground: i64,
        max_retry_count: u32,
        iterations: u32,
        rng_mode: RngMode,
    ) -> Self {
        let patterns_count = rules.patterns_count() as i64;
        let boundary = BoundaryPolicy::new(rules.catalog().pattern_size(), grid.looping());
        let seed = rng_mode.to_seed();
        let wave = WaveState::new(&rules, grid.total_size());

        #[cfg(feature = "debug-traces")]
        info!(
            "Created generator with {} patterns on grid {}, seed {}",
            patterns_count, grid, seed
        );

        Self {
            // Negative ground ids count from the last pattern
            ground: (ground.rem_euclid(patterns_count)) as PatternIndex,
            grid,
            rules,
            boundary,
            max_retry_count,
            iterations,

            seed,
            rng: StdRng::seed_from_u64(seed),
            run_seed: None,
            state: GenerationState::Init,
            wave,
            observed: None,
            observers: Vec::new(),
        }
    }

    /// Returns the seed that was used to initialize the generator RNG for this generation. See [`RngMode`] for more information.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the [`GridDefinition`] used by the generator
    pub fn grid(&self) -> &GridDefinition {
        &self.grid
    }

    /// Returns the [`Rules`] used by the generator
    pub fn rules(&self) -> &Arc<Rules> {
        &self.rules
    }

    /// Returns the [`BoundaryPolicy`] of the output grid
    pub fn boundary(&self) -> BoundaryPolicy {
        self.boundary
    }

    /// Returns the current [`GenerationState`]
    pub fn status(&self) -> GenerationState {
        self.state
    }

    /// Returns the pattern of each node once the generation is done, `None` before that.
    pub fn observed(&self) -> Option<&Vec<Option<PatternIndex>>> {
        self.observed.as_ref()
    }

    /// Runs at most `limit` observation/propagation steps, or until the generation ends if `limit` is `0`.
    ///
    /// A `seed` of `0` selects a non-reproducible random source, any other value a reproducible one. Consecutive calls with the same seed continue the same random sequence.
    ///
    /// Returns `false` if the generation failed due to a contradiction and `true` otherwise, including when `limit` was reached before the end of the generation. Use [`Generator::status`] or [`Generator::sample`] to know whether the generation is done.
    pub fn run(&mut self, seed: u64, limit: u32) -> bool {
        if self.run_seed != Some(seed) {
            self.run_seed = Some(seed);
            self.reseed(RngMode::from_seed(seed).to_seed());
        }
        self.run_steps(limit).is_ok()
    }

    /// Runs with the iterations limit given to the builder, using the generator current random source.
    ///
    /// Meant to be called periodically (once per frame for example) until the generation is done.
    pub fn run_incremental(&mut self) -> Result<GenerationStatus, GeneratorError> {
        self.run_steps(self.iterations)
    }

    /// Advances the generation by one "step": select a node and a pattern and propagate the changes.
    ///
    /// Returns the [`GenerationStatus`] if the step executed successfully and [`GeneratorError`] if the generation fails due to a contradiction.
    ///
    /// **Note**: One call to `select_and_propagate` **can** lead to more than one node generated if the propagation phase forces some other node(s) into a definite state.
    pub fn select_and_propagate(&mut self) -> Result<GenerationStatus, GeneratorError> {
        self.run_steps(1)
    }

    /// Tries to generate the whole grid. If the generation fails due to a contradiction, it will retry `max_retry_count` times before returning the last encountered [`GeneratorError`]
    ///
    /// If the generation has ended (successful or not), calling `generate` will reinitialize the generator before starting the generation.
    /// If the generation was already started by previous calls to `run` or `select_and_propagate`, this will simply continue the generation.
    pub fn generate(&mut self) -> Result<GenInfo, GeneratorError> {
        let mut last_error = GeneratorError { node_index: 0 };
        for try_index in 0..=self.max_retry_count {
            #[cfg(feature = "debug-traces")]
            info!("Try n°{}", try_index + 1);

            match self.state {
                GenerationState::Init | GenerationState::Ongoing => (),
                GenerationState::Done | GenerationState::Failed(_) => self.reinitialize(),
            }
            match self.run_steps(0) {
                Ok(_) => {
                    return Ok(GenInfo {
                        try_count: try_index + 1,
                    })
                }
                Err(err) => last_error = err,
            }
        }
        Err(last_error)
    }

    /// Same as `generate` but returns the symbol of every node of the grid
    pub fn generate_grid(&mut self) -> Result<GridData<Option<u8>>, GeneratorError> {
        self.generate()?;
        Ok(self.to_grid_data())
    }

    /// Discards the current generation. The wave will be reset on the next run, using a new seed generated from the current random source.
    pub fn reinitialize(&mut self) {
        let next_seed = self.rng.gen::<u64>();
        self.reseed(next_seed);
        self.run_seed = None;
        self.state = GenerationState::Init;
        self.observed = None;

        #[cfg(feature = "debug-traces")]
        info!("Reinitializing generator with seed {}", self.seed);

        for obs in &mut self.observers {
            let _ = obs.send(GenerationUpdate::Reinitialized(self.seed));
        }
    }

    /// Returns the symbol of the top-left pixel of the pattern of node `(x, y)` if this node has exactly one possible pattern, `None` otherwise.
    ///
    /// With a non-periodic output, nodes of the right and top margins are never observed and always return `None`. See [`Generator::sample_covered`] to render them.
    pub fn sample(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.grid.size_x() || y >= self.grid.size_y() {
            return None;
        }
        self.single_pattern(self.grid.get_index(x, y))
            .map(|pattern| self.rules.catalog().symbol(pattern, 0, 0))
    }

    /// Returns the symbol covering `(x, y)` if it is determined, `None` otherwise.
    ///
    /// Same as [`Generator::sample`] on observable nodes. Nodes of the margin of a non-periodic output are read in the pattern of the last observable node of their row and column.
    pub fn sample_covered(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.grid.size_x() || y >= self.grid.size_y() {
            return None;
        }
        let (node_index, dx, dy) = self.boundary.covering_node(&self.grid, x, y);
        let size = self.rules.catalog().pattern_size() as u32;
        if dx >= size || dy >= size {
            return None;
        }
        self.single_pattern(node_index)
            .map(|pattern| self.rules.catalog().symbol(pattern, dx as usize, dy as usize))
    }

    /// Returns the number of patterns still possible on a node
    pub fn possible_patterns_count(&self, node_index: NodeIndex) -> usize {
        self.wave.possible_patterns_count(node_index)
    }

    /// Returns the symbols of the whole grid, margin included, see [`Generator::sample_covered`]
    pub fn to_grid_data(&self) -> GridData<Option<u8>> {
        let mut grid_data = self.grid.new_grid_data(None);
        for y in 0..self.grid.size_y() {
            for x in 0..self.grid.size_x() {
                *grid_data.get_2d_mut(x, y) = self.sample_covered(x, y);
            }
        }
        grid_data
    }

    pub(crate) fn add_observer_queue(&mut self) -> crossbeam_channel::Receiver<GenerationUpdate> {
        // We can't simply bound to the number of nodes since we might retry some generations.
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.observers.push(sender);
        receiver
    }

    fn single_pattern(&self, node_index: NodeIndex) -> Option<PatternIndex> {
        match self.wave.possible_patterns_count(node_index) {
            1 => self.wave.first_possible(node_index),
            _ => None,
        }
    }

    fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    fn run_steps(&mut self, limit: u32) -> Result<GenerationStatus, GeneratorError> {
        if let GenerationState::Init = self.state {
            self.initialize();
        }
        let mut step = 0;
        while limit == 0 || step < limit {
            match self.state {
                GenerationState::Init | GenerationState::Ongoing => (),
                GenerationState::Done => return Ok(GenerationStatus::Done),
                GenerationState::Failed(err) => return Err(err),
            }
            self.observe_and_propagate();
            step += 1;
        }
        match self.state {
            GenerationState::Done => Ok(GenerationStatus::Done),
            GenerationState::Failed(err) => Err(err),
            GenerationState::Init | GenerationState::Ongoing => Ok(GenerationStatus::Ongoing),
        }
    }

    /// Resets the wave and pins the ground pattern if any.
    fn initialize(&mut self) {
        #[cfg(feature = "debug-traces")]
        debug!("Initializing wave");

        // Also sets the support counters, left unset by `WaveState::new`
        self.wave.clear(&self.rules);
        self.observed = None;
        self.state = GenerationState::Ongoing;

        if self.ground != 0 {
            #[cfg(feature = "debug-traces")]
            debug!("Pinning ground pattern {} on the bottom row", self.ground);

            for x in 0..self.grid.size_x() {
                let node_index = self.grid.get_index(x, 0);
                for pattern in 0..self.rules.patterns_count() {
                    if pattern != self.ground {
                        self.ban(node_index, pattern);
                    }
                }
            }
            self.propagate();
        }
    }

    fn observe_and_propagate(&mut self) {
        let node_index = match select_node(&self.wave, &self.grid, &self.boundary, &mut self.rng)
        {
            NodeSelection::Selected(node_index) => node_index,
            NodeSelection::Contradiction(node_index) => {
                self.signal_contradiction(node_index);
                return;
            }
            NodeSelection::AllDecided => {
                self.observed = Some(
                    self.grid
                        .indexes()
                        .map(|node_index| self.wave.first_possible(node_index))
                        .collect(),
                );
                self.state = GenerationState::Done;

                #[cfg(feature = "debug-traces")]
                info!("Generation done, seed {}", self.seed);
                return;
            }
        };

        // "Observe/collapse" the node: select a pattern for the node
        let mut distribution = vec![0.; self.rules.patterns_count()];
        for pattern in self.wave.possible_patterns(node_index) {
            distribution[pattern] = self.rules.weight(pattern);
        }
        let selected_pattern = weighted_index(&distribution, self.rng.gen::<f64>());

        #[cfg(feature = "debug-traces")]
        debug!(
            "Heuristics selected pattern {} for node {} at position {:?}",
            selected_pattern,
            node_index,
            self.grid.get_position(node_index)
        );

        for pattern in 0..self.rules.patterns_count() {
            if pattern != selected_pattern {
                self.ban(node_index, pattern);
            }
        }
        self.propagate();
    }

    /// Propagates all the queued bans, until no ban is left to propagate.
    fn propagate(&mut self) {
        // Clone the ref to allow for mutability of other members in the interior loops
        let rules = Arc::clone(&self.rules);

        while let Some(from) = self.wave.pop_propagation() {
            let from_position = self.grid.get_position(from.node_index);

            #[cfg(feature = "debug-traces")]
            trace!(
                "Propagate removal of pattern {} for node {}",
                from.pattern_index,
                from.node_index
            );

            // We want to update all the adjacent nodes (= in all directions)
            for &dir in CARTESIAN_2D_DIRECTIONS {
                // Get the adjacent node in this direction, it may be excluded by the boundary.
                let Some(to_node_index) = self.boundary.neighbour(&self.grid, &from_position, dir)
                else {
                    continue;
                };
                // Decrease the support count of all patterns previously supported by "from"
                for &pattern in rules.allowed_patterns(from.pattern_index, dir) {
                    let supports_count = self.wave.supports(to_node_index, pattern, dir as usize);
                    // Banned patterns have their supports set to 0, they must not be banned again.
                    if *supports_count > 0 {
                        *supports_count -= 1;
                        if *supports_count == 0 {
                            self.ban(to_node_index, pattern);
                        }
                    }
                }
            }
        }
    }

    /// Bans `pattern` from `node_index` if it is still possible there.
    fn ban(&mut self, node_index: NodeIndex, pattern: PatternIndex) {
        if !self.wave.ban(&self.rules, node_index, pattern) {
            return;
        }

        #[cfg(feature = "debug-traces")]
        trace!(
            "Ban pattern {} from node {}, {} patterns left",
            pattern,
            node_index,
            self.wave.possible_patterns_count(node_index)
        );

        if self.wave.possible_patterns_count(node_index) == 1 && !self.observers.is_empty() {
            if let Some(pattern_index) = self.wave.first_possible(node_index) {
                let update = GenerationUpdate::Generated(GridNode {
                    node_index,
                    pattern_index,
                    symbol: self.rules.catalog().symbol(pattern_index, 0, 0),
                });
                for obs in &mut self.observers {
                    let _ = obs.send(update);
                }
            }
        }
    }

    fn signal_contradiction(&mut self, node_index: NodeIndex) {
        #[cfg(feature = "debug-traces")]
        debug!(
            "Generation failed due to a contradiction at node {}",
            node_index
        );

        self.state = GenerationState::Failed(GeneratorError { node_index });
        for obs in &mut self.observers {
            let _ = obs.send(GenerationUpdate::Failed(node_index));
        }
    }
}

#[cfg(test)]
mod tests {

    use super::{
        builder::GeneratorBuilder,
        observer::{GenerationUpdate, QueuedObserver, QueuedStatefulObserver},
        sample::Sample,
        *,
    };

    fn checkerboard(size_x: u32, size_y: u32, periodic_output: bool) -> Generator {
        GeneratorBuilder::new()
            .with_sample(Sample::from_rows(&[&[0, 1], &[1, 0]]))
            .with_pattern_size(2)
            .with_output_size(size_x, size_y)
            .with_periodic_input(true)
            .with_periodic_output(periodic_output)
            .with_symmetry(8)
            .with_rng(RngMode::Seeded(1))
            .build()
            .unwrap()
    }

    fn flowers() -> Sample {
        Sample::from_rows(&[
            &[1, 1, 1, 1, 1, 1],
            &[1, 2, 1, 1, 3, 1],
            &[1, 1, 1, 1, 1, 1],
            &[1, 1, 3, 1, 1, 1],
            &[1, 1, 1, 1, 2, 1],
            &[1, 1, 1, 1, 1, 1],
        ])
    }

    fn flowers_generator(seed: u64) -> Generator {
        GeneratorBuilder::new()
            .with_sample(flowers())
            .with_pattern_size(2)
            .with_output_size(16, 16)
            .with_periodic_input(true)
            .with_periodic_output(true)
            .with_symmetry(8)
            .with_rng(RngMode::Seeded(seed))
            .build()
            .unwrap()
    }

    #[test]
    fn end_to_end_checkerboard() {
        let mut generator = checkerboard(12, 12, true);
        assert!(generator.run(1, 0));
        assert_eq!(generator.status(), GenerationState::Done);
        for y in 0..12 {
            for x in 0..12 {
                let symbol = generator.sample(x, y);
                assert!(symbol == Some(0) || symbol == Some(1));
                assert_ne!(symbol, generator.sample((x + 1) % 12, y));
            }
        }
        assert_eq!(generator.sample(12, 0), None);
    }

    #[test]
    fn uninitialized_cells_have_no_sample() {
        let generator = checkerboard(4, 4, true);
        assert_eq!(generator.status(), GenerationState::Init);
        assert_eq!(generator.sample(0, 0), None);
        assert_eq!(generator.sample_covered(3, 3), None);
    }

    #[test]
    fn uniform_sample() {
        let mut generator = GeneratorBuilder::new()
            .with_sample(Sample::from_rows(&[&[3]]))
            .with_pattern_size(1)
            .with_output_size(4, 3)
            .with_periodic_input(true)
            .with_rng(RngMode::Seeded(9))
            .build()
            .unwrap();
        assert_eq!(generator.rules().patterns_count(), 1);
        assert!(generator.run(9, 0));
        assert!(generator.to_grid_data().nodes().iter().all(|s| *s == Some(3)));
    }

    #[test]
    fn success_leaves_a_single_pattern_per_node() {
        let mut generator = flowers_generator(5);
        assert!(generator.run(5, 0));
        assert_eq!(generator.status(), GenerationState::Done);
        for node_index in generator.grid().indexes() {
            assert_eq!(generator.possible_patterns_count(node_index), 1);
        }
        let observed = generator.observed().unwrap();
        assert!(observed.iter().all(|pattern| pattern.is_some()));
    }

    #[test]
    fn same_seed_same_output() {
        let mut first = flowers_generator(1);
        let mut second = flowers_generator(1);
        assert_eq!(first.run(42, 0), second.run(42, 0));
        assert_eq!(first.status(), second.status());
        assert_eq!(first.to_grid_data().nodes(), second.to_grid_data().nodes());

        assert_eq!(first.generate(), second.generate());
        assert_eq!(first.seed(), second.seed());
        assert_eq!(first.to_grid_data().nodes(), second.to_grid_data().nodes());
    }

    /// Every possible pattern keeps a support from each existing source neighbour
    fn assert_fixpoint(generator: &mut Generator) {
        assert_eq!(generator.wave.pending_propagations(), 0);
        let mut checked = 0;
        for node_index in generator.grid().indexes() {
            let position = generator.grid().get_position(node_index);
            let possible: Vec<_> = generator.wave.possible_patterns(node_index).collect();
            for pattern in possible {
                for &direction in CARTESIAN_2D_DIRECTIONS {
                    let source = generator.boundary.neighbour(
                        &generator.grid,
                        &position,
                        direction.opposite(),
                    );
                    if source.is_some() {
                        checked += 1;
                        let supports = generator.wave.supports(node_index, pattern, direction as usize);
                        assert!(*supports > 0);
                    }
                }
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn propagation_reaches_a_fixpoint() {
        let mut generator = flowers_generator(3);
        for _ in 0..4 {
            assert!(generator.select_and_propagate().is_ok());
        }
        assert_eq!(generator.status(), GenerationState::Ongoing);
        assert_fixpoint(&mut generator);
    }

    #[test]
    fn bounded_propagation_reaches_a_fixpoint() {
        let mut generator = checkerboard(7, 5, false);
        assert_eq!(
            generator.select_and_propagate(),
            Ok(GenerationStatus::Ongoing)
        );
        assert_fixpoint(&mut generator);
        // Margin nodes are never propagated into
        let margin = generator.grid().get_index(6, 4);
        assert_eq!(generator.possible_patterns_count(margin), 2);
    }

    #[test]
    fn weight_sums_stay_consistent() {
        let mut generator = flowers_generator(11);
        generator.run(11, 6);
        for node_index in generator.grid().indexes() {
            let from_scratch: f64 = generator
                .wave
                .possible_patterns(node_index)
                .map(|pattern| generator.rules.weight(pattern))
                .sum();
            if from_scratch > 0. {
                let data = generator.wave.entropy_data(node_index);
                assert!((data.weight_sum - from_scratch).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn bounded_output_is_fully_sampled() {
        let mut generator = checkerboard(7, 5, false);
        assert_eq!(generator.boundary(), BoundaryPolicy::Bounded { pattern_size: 2 });
        assert!(generator.run(2, 0));
        let grid_data = generator.to_grid_data();
        for y in 0..5 {
            for x in 0..7 {
                let symbol = grid_data.get_2d(x, y).unwrap();
                if x > 0 {
                    assert_ne!(Some(symbol), *grid_data.get_2d(x - 1, y));
                }
            }
        }
        // The margin is never observed, only its covered symbol is known
        let margin = generator.grid().get_index(6, 4);
        assert_eq!(generator.possible_patterns_count(margin), 2);
        assert_eq!(generator.sample(6, 4), None);
        assert_eq!(generator.sample(6, 0), None);
        assert!(generator.sample_covered(6, 4).is_some());
        assert_eq!(generator.sample(5, 3), generator.sample_covered(5, 3));
        assert!(generator.sample(5, 3).is_some());
    }

    #[test]
    fn ground_pattern_is_pinned_on_the_bottom_row() {
        let mut generator = GeneratorBuilder::new()
            .with_sample(Sample::from_rows(&[&[1, 1], &[2, 2]]))
            .with_pattern_size(2)
            .with_output_size(6, 6)
            .with_periodic_input(true)
            .with_periodic_output(true)
            .with_ground(-1)
            .with_rng(RngMode::Seeded(4))
            .build()
            .unwrap();
        assert_eq!(generator.rules().patterns_count(), 2);
        assert!(generator.run(4, 0));
        let observed = generator.observed().unwrap();
        for x in 0..6 {
            assert_eq!(observed[generator.grid().get_index(x, 0)], Some(1));
        }
    }

    #[test]
    fn contradiction_is_terminal() {
        // An odd checkerboard cannot wrap
        let mut generator = checkerboard(5, 5, true);
        assert!(!generator.run(1, 0));
        assert!(matches!(generator.status(), GenerationState::Failed(_)));
        assert!(!generator.run(1, 0));
        assert!(!generator.run(2, 0));
        assert!(generator.select_and_propagate().is_err());

        generator.reinitialize();
        assert_eq!(generator.status(), GenerationState::Init);
        assert!(generator.generate().is_err());
    }

    #[test]
    fn limit_bounds_each_run() {
        let mut generator = checkerboard(8, 8, true);
        assert!(generator.run(3, 1));
        assert_eq!(generator.status(), GenerationState::Ongoing);
        // A single observation forces the whole checkerboard
        assert!(generator.to_grid_data().nodes().iter().all(|s| s.is_some()));
        assert!(generator.run(3, 0));
        assert_eq!(generator.status(), GenerationState::Done);
    }

    #[test]
    fn incremental_runs_use_the_iterations_limit() {
        let mut generator = GeneratorBuilder::new()
            .with_sample(flowers())
            .with_output_size(10, 10)
            .with_periodic_output(true)
            .with_iterations(1)
            .with_rng(RngMode::Seeded(8))
            .build()
            .unwrap();
        let mut calls = 0;
        loop {
            calls += 1;
            match generator.run_incremental() {
                Ok(GenerationStatus::Ongoing) => (),
                Ok(GenerationStatus::Done) | Err(_) => break,
            }
        }
        assert!(calls > 1);
    }

    #[test]
    fn generate_retries_with_new_seeds() {
        let mut generator = GeneratorBuilder::new()
            .with_sample(flowers())
            .with_output_size(12, 12)
            .with_periodic_input(true)
            .with_periodic_output(true)
            .with_max_retry_count(20)
            .with_rng(RngMode::Seeded(6))
            .build()
            .unwrap();
        let first_seed = generator.seed();
        match generator.generate() {
            Ok(info) => {
                assert!(info.try_count >= 1);
                if info.try_count > 1 {
                    assert_ne!(generator.seed(), first_seed);
                }
            }
            Err(err) => assert!(err.node_index < 144),
        }
    }

    #[test]
    fn observers_follow_the_generation() {
        let mut generator = checkerboard(6, 6, true);
        let mut stateful = QueuedStatefulObserver::new(&mut generator);
        let mut queued = QueuedObserver::new(&mut generator);

        generator.generate_grid().unwrap();
        stateful.dequeue_all();
        for (node_index, node) in stateful.grid_data().nodes().iter().enumerate() {
            let node = node.unwrap();
            let position = generator.grid().get_position(node_index);
            assert_eq!(node.node_index, node_index);
            assert_eq!(Some(node.symbol), generator.sample(position.x, position.y));
        }
        assert_eq!(queued.dequeue_all().len(), 36);

        generator.reinitialize();
        assert_eq!(
            stateful.dequeue_one(),
            Some(GenerationUpdate::Reinitialized(generator.seed()))
        );
        assert!(stateful.grid_data().nodes().iter().all(|n| n.is_none()));
        assert!(queued.dequeue_one().is_some());
        assert_eq!(queued.dequeue_one(), None);
    }
}
