//! Generational EDA driver
//!
//! One generation is: select a training set, fit the model, sample a full
//! replacement population, evaluate it, apply elitism, update the tracked
//! best, notify the observer. The loop stops when the termination predicate
//! fires after a generation.

use std::time::Instant;

use tracing::{debug, info};

use crate::algorithms::eda::config::{EdaConfig, ElitismPolicy};
use crate::algorithms::eda::evaluator::Evaluator;
use crate::diagnostics::{EvolutionResult, EvolutionStats, GenerationStats, TimingStats};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::{FeasibilityCheck, FitnessValue, Problem};
use crate::genome::traits::EvolutionaryGenome;
use crate::models::Model;
use crate::population::individual::Individual;
use crate::population::population::Population;
use crate::representation::{ConstraintHandling, IdentityConstraint, Representation};
use crate::rng::RngManager;
use crate::selection::Selection;
use crate::termination::{AnyOf, EvolutionState, MaxGenerations, TerminationCriterion};

/// Callback invoked synchronously at the end of every generation.
///
/// Implemented for any `FnMut(usize, &Individual, &Population) + Send`.
pub trait ProgressObserver<G: EvolutionaryGenome, F: FitnessValue>: Send {
    fn on_generation_done(
        &mut self,
        generation: usize,
        best: &Individual<G, F>,
        population: &Population<G, F>,
    );
}

impl<G, F, T> ProgressObserver<G, F> for T
where
    G: EvolutionaryGenome,
    F: FitnessValue,
    T: FnMut(usize, &Individual<G, F>, &Population<G, F>) + Send,
{
    fn on_generation_done(
        &mut self,
        generation: usize,
        best: &Individual<G, F>,
        population: &Population<G, F>,
    ) {
        self(generation, best, population)
    }
}

type Genome<P> = <P as Problem>::Genome;
type Value<P> = <P as Problem>::Value;

/// Builder for [`Eda`]
pub struct EdaBuilder<P, M, S>
where
    P: Problem,
{
    config: EdaConfig,
    problem: Option<P>,
    representation: Option<Box<dyn Representation<Genome<P>>>>,
    model: Option<M>,
    selection: Option<S>,
    constraint: Option<Box<dyn ConstraintHandling<Genome<P>>>>,
    termination: Option<Box<dyn TerminationCriterion<Genome<P>, Value<P>>>>,
    observer: Option<Box<dyn ProgressObserver<Genome<P>, Value<P>>>>,
    evaluator: Evaluator,
}

impl<P, M, S> EdaBuilder<P, M, S>
where
    P: Problem,
    M: Model<Genome<P>>,
    S: Selection,
{
    pub fn new() -> Self {
        Self {
            config: EdaConfig::default(),
            problem: None,
            representation: None,
            model: None,
            selection: None,
            constraint: None,
            termination: None,
            observer: None,
            evaluator: Evaluator::default(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: EdaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    pub fn selection_size(mut self, size: usize) -> Self {
        self.config.selection_size = size;
        self
    }

    pub fn elitism(mut self, policy: ElitismPolicy) -> Self {
        self.config.elitism = policy;
        self
    }

    pub fn max_generations(mut self, max: usize) -> Self {
        self.config.max_generations = max;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn problem(mut self, problem: P) -> Self {
        self.problem = Some(problem);
        self
    }

    pub fn representation<R>(mut self, representation: R) -> Self
    where
        R: Representation<Genome<P>> + 'static,
    {
        self.representation = Some(Box::new(representation));
        self
    }

    pub fn model(mut self, model: M) -> Self {
        self.model = Some(model);
        self
    }

    pub fn selection(mut self, selection: S) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Defaults to [`IdentityConstraint`]
    pub fn constraint<C>(mut self, constraint: C) -> Self
    where
        C: ConstraintHandling<Genome<P>> + 'static,
    {
        self.constraint = Some(Box::new(constraint));
        self
    }

    /// Extra stopping condition, checked alongside `max_generations`
    pub fn termination<T>(mut self, termination: T) -> Self
    where
        T: TerminationCriterion<Genome<P>, Value<P>> + 'static,
    {
        self.termination = Some(Box::new(termination));
        self
    }

    pub fn observer<O>(mut self, observer: O) -> Self
    where
        O: ProgressObserver<Genome<P>, Value<P>> + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn evaluator(mut self, evaluator: Evaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    /// Validate and assemble the driver
    pub fn build(self) -> EvoResult<Eda<P, M, S>> {
        let missing =
            |what: &str| EvolutionError::Configuration(format!("{what} must be specified"));
        let problem = self.problem.ok_or_else(|| missing("Problem"))?;
        let representation = self.representation.ok_or_else(|| missing("Representation"))?;
        let model = self.model.ok_or_else(|| missing("Model"))?;
        let selection = self.selection.ok_or_else(|| missing("Selection"))?;
        self.config.validate()?;
        if representation.length() == 0 {
            return Err(EvolutionError::Configuration(
                "Genotype length must be positive".to_string(),
            ));
        }

        let cap: Box<dyn TerminationCriterion<Genome<P>, Value<P>>> =
            Box::new(MaxGenerations::new(self.config.max_generations));
        let termination: Box<dyn TerminationCriterion<Genome<P>, Value<P>>> =
            match self.termination {
                Some(extra) => Box::new(AnyOf::new(vec![cap, extra])),
                None => cap,
            };
        let sense = problem.objective_sense();

        Ok(Eda {
            rngs: RngManager::new(self.config.seed),
            config: self.config,
            problem,
            representation,
            model,
            selection,
            constraint: self.constraint.unwrap_or_else(|| Box::new(IdentityConstraint)),
            termination,
            observer: self.observer,
            evaluator: self.evaluator,
            population: Population::new(sense),
            best: None,
            evaluations: 0,
            fitness_history: Vec::new(),
            stats: EvolutionStats::new(sense),
            initialized: false,
        })
    }
}

impl<P, M, S> Default for EdaBuilder<P, M, S>
where
    P: Problem,
    M: Model<Genome<P>>,
    S: Selection,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Estimation-of-distribution algorithm over problem `P` with model `M`
/// and selection `S`
pub struct Eda<P, M, S>
where
    P: Problem,
{
    config: EdaConfig,
    problem: P,
    representation: Box<dyn Representation<Genome<P>>>,
    model: M,
    selection: S,
    constraint: Box<dyn ConstraintHandling<Genome<P>>>,
    termination: Box<dyn TerminationCriterion<Genome<P>, Value<P>>>,
    observer: Option<Box<dyn ProgressObserver<Genome<P>, Value<P>>>>,
    evaluator: Evaluator,
    rngs: RngManager,
    population: Population<Genome<P>, Value<P>>,
    best: Option<Individual<Genome<P>, Value<P>>>,
    evaluations: usize,
    fitness_history: Vec<f64>,
    stats: EvolutionStats,
    initialized: bool,
}

impl<P, M, S> Eda<P, M, S>
where
    P: Problem,
    M: Model<Genome<P>>,
    S: Selection,
{
    pub fn builder() -> EdaBuilder<P, M, S> {
        EdaBuilder::new()
    }

    pub fn config(&self) -> &EdaConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Current population
    pub fn population(&self) -> &Population<Genome<P>, Value<P>> {
        &self.population
    }

    /// Best individual seen so far, `None` before initialisation
    pub fn best(&self) -> Option<&Individual<Genome<P>, Value<P>>> {
        self.best.as_ref()
    }

    /// Completed generations; 0 after initialisation
    pub fn generation(&self) -> usize {
        self.population.generation()
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn stats(&self) -> &EvolutionStats {
        &self.stats
    }

    fn track_best(&mut self) {
        let sense = self.population.sense();
        if let Some(candidate) = self.population.best() {
            let improves = self
                .best
                .as_ref()
                .map_or(true, |best| candidate.is_better_than(best, sense));
            if improves {
                self.best = Some(candidate.clone());
            }
        }
        let tracked = self.best.as_ref().map_or(f64::NAN, Individual::fitness_f64);
        self.fitness_history.push(tracked);
    }

    /// Create and evaluate generation 0. Called by [`run`](Self::run) when
    /// needed; calling it again restarts from a fresh random population
    /// without resetting the random streams.
    pub fn initialize(&mut self) -> EvoResult<()> {
        let start = Instant::now();
        let size = self.config.population_size;
        let feasibility: &dyn FeasibilityCheck<Genome<P>> = &self.problem;
        let genomes: Vec<Genome<P>> = (0..size)
            .map(|_| {
                let raw = self.representation.random(self.rngs.stream("init"));
                self.constraint.enforce(
                    raw,
                    self.representation.as_ref(),
                    Some(feasibility),
                    self.rngs.stream("constraint"),
                )
            })
            .collect();

        let eval_start = Instant::now();
        let individuals = self.evaluator.evaluate(&self.problem, genomes, 0)?;
        let eval_time = eval_start.elapsed();
        self.evaluations = individuals.len();

        self.population = Population::from_individuals(individuals, self.problem.objective_sense());
        self.best = None;
        self.fitness_history.clear();
        self.stats = EvolutionStats::new(self.population.sense());
        self.population.sort_by_fitness();
        self.track_best();

        let timing = TimingStats::new()
            .with_evaluation(eval_time)
            .with_total(start.elapsed());
        let gen_stats = GenerationStats::from_population(&self.population, 0, self.evaluations)
            .with_timing(timing);
        self.stats.record(gen_stats);
        self.initialized = true;
        debug!(
            population = size,
            best = self.fitness_history.last().copied().unwrap_or(f64::NAN),
            "initial population evaluated"
        );
        Ok(())
    }

    /// Run one generation
    pub fn step(&mut self) -> EvoResult<()> {
        if !self.initialized {
            return self.initialize();
        }
        let start = Instant::now();
        let generation = self.population.generation() + 1;

        let t = Instant::now();
        let selected = self.selection.select(
            &self.population,
            self.config.selection_size,
            self.rngs.stream("selection"),
        );
        let selection_time = t.elapsed();

        let t = Instant::now();
        self.model
            .fit(&selected, self.representation.as_ref(), self.rngs.stream("model-fit"))?;
        let fitting_time = t.elapsed();

        let t = Instant::now();
        let feasibility: &dyn FeasibilityCheck<Genome<P>> = &self.problem;
        let genomes = self.model.sample(
            self.config.population_size,
            self.representation.as_ref(),
            Some(feasibility),
            self.constraint.as_ref(),
            self.rngs.stream("model-sample"),
        )?;
        let sampling_time = t.elapsed();

        let t = Instant::now();
        let individuals = self.evaluator.evaluate(&self.problem, genomes, generation)?;
        let evaluation_time = t.elapsed();
        self.evaluations += individuals.len();

        let mut offspring = Population::from_individuals(individuals, self.population.sense());
        offspring.set_generation(generation);
        self.population = self.config.elitism.apply(&self.population, offspring);
        self.population.set_generation(generation);
        self.track_best();

        let diagnostics = self.model.diagnostics();
        let timing = TimingStats::new()
            .with_selection(selection_time)
            .with_fitting(fitting_time)
            .with_sampling(sampling_time)
            .with_evaluation(evaluation_time)
            .with_total(start.elapsed());
        let gen_stats =
            GenerationStats::from_population(&self.population, generation, self.evaluations)
                .with_timing(timing)
                .with_model(diagnostics);
        debug!(
            generation,
            best = gen_stats.best_fitness,
            mean = gen_stats.mean_fitness,
            model_metrics = gen_stats.model.len(),
            "generation done"
        );
        self.stats.record(gen_stats);

        if let (Some(observer), Some(best)) = (self.observer.as_mut(), self.best.as_ref()) {
            observer.on_generation_done(generation, best, &self.population);
        }
        Ok(())
    }

    fn state(&self) -> EvolutionState<'_, Genome<P>, Value<P>> {
        EvolutionState {
            generation: self.population.generation(),
            evaluations: self.evaluations,
            best_fitness: self.best.as_ref().map_or(f64::NAN, Individual::fitness_f64),
            population: &self.population,
            fitness_history: &self.fitness_history,
        }
    }

    /// Whether the termination predicate holds for the current state
    pub fn should_stop(&self) -> bool {
        self.initialized && self.termination.should_terminate(&self.state())
    }

    /// Run until the termination predicate fires
    pub fn run(&mut self) -> EvoResult<EvolutionResult<Genome<P>, Value<P>>> {
        let start = Instant::now();
        info!(
            problem = self.problem.name(),
            model = self.model.name(),
            selection = self.selection.name(),
            population = self.config.population_size,
            seed = self.config.seed,
            "starting run"
        );
        if !self.initialized {
            self.initialize()?;
        }
        while !self.should_stop() {
            self.step()?;
        }

        let reason = self.termination.explain(&self.state());
        self.stats.set_termination_reason(reason);
        self.stats.set_runtime(start.elapsed());
        let best = self.best.clone().ok_or(EvolutionError::EmptyPopulation)?;
        info!(
            generations = self.generation(),
            evaluations = self.evaluations,
            best = best.fitness_f64(),
            reason,
            "run finished"
        );

        Ok(EvolutionResult {
            best,
            population: self.population.clone(),
            generations: self.generation(),
            evaluations: self.evaluations,
            stats: self.stats.clone(),
        })
    }
}
