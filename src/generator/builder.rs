use std::{marker::PhantomData, sync::Arc};

#[cfg(feature = "debug-traces")]
use tracing::info;

use crate::{
    grid::GridDefinition,
    tiles::{CompiledSample, Training},
    CatalogError,
};

use super::{pattern::PatternCatalog, rules::Rules, sample::Sample, Generator, RngMode};

/// Default retry count for the generator
pub const DEFAULT_RETRY_COUNT: u32 = 10;
/// Default side of the extracted patterns
pub const DEFAULT_PATTERN_SIZE: usize = 2;
/// Default size of the output grid, on both axis
pub const DEFAULT_OUTPUT_SIZE: u32 = 20;

/// Internal type used to provide a type-safe builder with a source of [`Rules`]
pub enum Set {}
/// Internal type used to provide a type-safe builder with a source of [`Rules`]
pub enum Unset {}

enum RulesSource {
    Sample(Sample),
    Rules(Arc<Rules>),
}

/// Used to instantiate a new [`Generator`].
///
/// A sample (or already built [`Rules`]) is the only non-optionnal input needed before being able to call `build`.
///
/// ### Example
///
/// ```
/// use ghx_overlap_gen::generator::{builder::GeneratorBuilder, sample::Sample, RngMode};
///
/// let mut generator = GeneratorBuilder::new()
///     .with_sample(Sample::from_rows(&[&[1, 2], &[2, 1]]))
///     .with_output_size(8, 8)
///     .with_periodic_input(true)
///     .with_periodic_output(true)
///     .with_rng(RngMode::Seeded(3))
///     .build()
///     .unwrap();
/// assert!(generator.run(3, 0));
/// ```
pub struct GeneratorBuilder<S> {
    source: Option<RulesSource>,
    pattern_size: usize,
    size_x: u32,
    size_y: u32,
    periodic_input: bool,
    periodic_output: bool,
    symmetry: usize,
    ground: i32,
    max_retry_count: u32,
    iterations: u32,
    rng_mode: RngMode,
    typestate: PhantomData<S>,
}

impl GeneratorBuilder<Unset> {
    /// Creates a [`GeneratorBuilder`] with its values set to their default.
    pub fn new() -> Self {
        Self {
            source: None,
            pattern_size: DEFAULT_PATTERN_SIZE,
            size_x: DEFAULT_OUTPUT_SIZE,
            size_y: DEFAULT_OUTPUT_SIZE,
            periodic_input: false,
            periodic_output: false,
            symmetry: 1,
            ground: 0,
            max_retry_count: DEFAULT_RETRY_COUNT,
            iterations: 0,
            rng_mode: RngMode::RandomSeed,
            typestate: PhantomData,
        }
    }

    /// Sets the [`Sample`] the patterns will be extracted from
    pub fn with_sample(self, sample: Sample) -> GeneratorBuilder<Set> {
        self.with_source(RulesSource::Sample(sample))
    }

    /// Compiles `training` and uses the resulting sample. See [`Training::compile`]
    ///
    /// Use [`GeneratorBuilder::with_compiled_sample`] to keep the tile table of the compiled training.
    pub fn with_training(self, training: &Training) -> Result<GeneratorBuilder<Set>, CatalogError> {
        let compiled = training.compile()?;
        Ok(self.with_compiled_sample(&compiled))
    }

    /// Uses the sample of an already compiled [`Training`]
    pub fn with_compiled_sample(self, compiled: &CompiledSample) -> GeneratorBuilder<Set> {
        self.with_sample(compiled.sample().clone())
    }

    /// Sets the [`Rules`] to be used by the [`Generator`]. The `Generator` will hold a read-only Arc onto those `Rules` which can be safely shared by multiple `Generator`.
    ///
    /// The pattern size, periodic input and symmetry parameters of the builder are ignored, the ones used to build the rules apply.
    pub fn with_shared_rules(self, rules: Arc<Rules>) -> GeneratorBuilder<Set> {
        self.with_source(RulesSource::Rules(rules))
    }

    fn with_source(self, source: RulesSource) -> GeneratorBuilder<Set> {
        GeneratorBuilder {
            source: Some(source),

            pattern_size: self.pattern_size,
            size_x: self.size_x,
            size_y: self.size_y,
            periodic_input: self.periodic_input,
            periodic_output: self.periodic_output,
            symmetry: self.symmetry,
            ground: self.ground,
            max_retry_count: self.max_retry_count,
            iterations: self.iterations,
            rng_mode: self.rng_mode,

            typestate: PhantomData,
        }
    }
}

impl<S> GeneratorBuilder<S> {
    /// Sets the side `N` of the square patterns extracted from the sample. Set to [`DEFAULT_PATTERN_SIZE`] by default.
    pub fn with_pattern_size(mut self, pattern_size: usize) -> Self {
        self.pattern_size = pattern_size;
        self
    }
    /// Sets the size of the output grid. Set to [`DEFAULT_OUTPUT_SIZE`] on both axis by default.
    pub fn with_output_size(mut self, size_x: u32, size_y: u32) -> Self {
        self.size_x = size_x;
        self.size_y = size_y;
        self
    }
    /// Whether the patterns extracted from the sample wrap around its edges. `false` by default.
    pub fn with_periodic_input(mut self, periodic_input: bool) -> Self {
        self.periodic_input = periodic_input;
        self
    }
    /// Whether the output wraps around its edges. `false` by default.
    pub fn with_periodic_output(mut self, periodic_output: bool) -> Self {
        self.periodic_output = periodic_output;
        self
    }
    /// How many of the 8 rotations/reflections of each pattern are added to the patterns. Clamped to `1..=8`, `1` by default.
    pub fn with_symmetry(mut self, symmetry: usize) -> Self {
        self.symmetry = symmetry;
        self
    }
    /// Pattern pinned on the bottom row of the output. `0` (the default) disables it, negative values count from the last pattern.
    pub fn with_ground(mut self, ground: i32) -> Self {
        self.ground = ground;
        self
    }
    /// Specifies how many time the [`Generator`] should retry to generate the grid when a contradiction is encountered. Set to [`DEFAULT_RETRY_COUNT`] by default.
    pub fn with_max_retry_count(mut self, max_retry_count: u32) -> Self {
        self.max_retry_count = max_retry_count;
        self
    }
    /// Maximum number of observations done by each [`Generator::run_incremental`] call. `0` (the default) runs until the generation ends.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }
    /// Specifies the [`RngMode`] to be used by the [`Generator`]. Defaults to [`RngMode::RandomSeed`].
    pub fn with_rng(mut self, rng_mode: RngMode) -> Self {
        self.rng_mode = rng_mode;
        self
    }
}

impl GeneratorBuilder<Set> {
    /// Instantiates a [`Generator`] as specified by the various builder parameters.
    ///
    /// Fails if the output grid is empty or if no pattern can be extracted from the sample.
    pub fn build(self) -> Result<Generator, CatalogError> {
        if self.size_x == 0 || self.size_y == 0 {
            return Err(CatalogError::InvalidOutputSize {
                size_x: self.size_x,
                size_y: self.size_y,
            });
        }
        let rules = match self.source {
            Some(RulesSource::Rules(rules)) => rules,
            Some(RulesSource::Sample(sample)) => Arc::new(Rules::new(PatternCatalog::new(
                &sample,
                self.pattern_size,
                self.periodic_input,
                self.symmetry,
            )?)),
            // Unreachable thanks to the typing
            None => return Err(CatalogError::NoPatterns),
        };

        #[cfg(feature = "debug-traces")]
        info!(
            "Building generator with {} patterns, output {}x{}",
            rules.patterns_count(),
            self.size_x,
            self.size_y
        );

        let grid = GridDefinition::new_cartesian_2d(self.size_x, self.size_y, self.periodic_output);
        Ok(Generator::new(
            rules,
            grid,
            i64::from(self.ground),
            self.max_retry_count,
            self.iterations,
            self.rng_mode,
        ))
    }
}
