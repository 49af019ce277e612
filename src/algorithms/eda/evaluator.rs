//! Fitness evaluation of one generation
//!
//! Every genotype of a batch is evaluated before the batch returns. A failed
//! or panicking evaluation aborts the whole batch and its results are
//! dropped.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
#[cfg(feature = "parallel")]
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::Problem;
use crate::population::individual::Individual;

/// Where fitness evaluations run
#[derive(Clone, Debug, Default)]
pub enum Evaluator {
    /// On the driver's thread, in population order
    #[default]
    Sequential,
    /// On a rayon pool; `None` uses the global pool
    #[cfg(feature = "parallel")]
    Parallel(Option<Arc<rayon::ThreadPool>>),
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "evaluation panicked".to_string()
    }
}

fn evaluate_one<P: Problem>(problem: &P, genome: &P::Genome) -> EvoResult<P::Value> {
    catch_unwind(AssertUnwindSafe(|| problem.try_evaluate(genome)))
        .map_err(|payload| EvolutionError::EvaluationAborted(panic_message(payload)))?
}

impl Evaluator {
    /// Parallel evaluation on the global rayon pool
    #[cfg(feature = "parallel")]
    pub fn parallel() -> Self {
        Evaluator::Parallel(None)
    }

    /// Parallel evaluation on a caller-supplied pool
    #[cfg(feature = "parallel")]
    pub fn with_pool(pool: Arc<rayon::ThreadPool>) -> Self {
        Evaluator::Parallel(Some(pool))
    }

    /// Evaluate `genomes`, returning individuals born in `generation` in
    /// input order
    pub fn evaluate<P: Problem>(
        &self,
        problem: &P,
        genomes: Vec<P::Genome>,
        generation: usize,
    ) -> EvoResult<Vec<Individual<P::Genome, P::Value>>> {
        let values: Vec<EvoResult<P::Value>> = match self {
            Evaluator::Sequential => genomes.iter().map(|g| evaluate_one(problem, g)).collect(),
            #[cfg(feature = "parallel")]
            Evaluator::Parallel(pool) => {
                let run = || {
                    genomes
                        .par_iter()
                        .map(|g| evaluate_one(problem, g))
                        .collect::<Vec<_>>()
                };
                match pool {
                    Some(pool) => pool.install(run),
                    None => run(),
                }
            }
        };

        genomes
            .into_iter()
            .zip(values)
            .map(|(genome, value)| {
                let mut individual = Individual::with_generation(genome, generation);
                individual.set_fitness(value?);
                Ok(individual)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::benchmarks::OneMax;
    use crate::fitness::traits::ObjectiveSense;
    use crate::genome::bit_string::BitString;
    use crate::genome::traits::BinaryGenome;

    struct Fragile;

    impl Problem for Fragile {
        type Genome = BitString;
        type Value = f64;

        fn evaluate(&self, genome: &BitString) -> f64 {
            if genome.count_ones() == 3 {
                panic!("three ones");
            }
            genome.count_ones() as f64
        }

        fn objective_sense(&self) -> ObjectiveSense {
            ObjectiveSense::Maximize
        }
    }

    struct Failing;

    impl Problem for Failing {
        type Genome = BitString;
        type Value = f64;

        fn evaluate(&self, _genome: &BitString) -> f64 {
            0.0
        }

        fn try_evaluate(&self, _genome: &BitString) -> EvoResult<f64> {
            Err(EvolutionError::FitnessEvaluation("offline".to_string()))
        }

        fn objective_sense(&self) -> ObjectiveSense {
            ObjectiveSense::Minimize
        }
    }

    fn genomes() -> Vec<BitString> {
        (0..16).map(|v| BitString::from_u64(v, 4)).collect()
    }

    #[test]
    fn test_sequential_preserves_order() {
        let out = Evaluator::Sequential.evaluate(&OneMax, genomes(), 3).unwrap();
        assert_eq!(out.len(), 16);
        for (v, ind) in out.iter().enumerate() {
            assert_eq!(ind.fitness, Some((v as u64).count_ones() as f64));
            assert_eq!(ind.birth_generation, 3);
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let seq = Evaluator::Sequential.evaluate(&OneMax, genomes(), 0).unwrap();
        let pool = Arc::new(rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap());
        for evaluator in [Evaluator::parallel(), Evaluator::with_pool(pool)] {
            let par = evaluator.evaluate(&OneMax, genomes(), 0).unwrap();
            let a: Vec<_> = seq.iter().map(|i| i.fitness).collect();
            let b: Vec<_> = par.iter().map(|i| i.fitness).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_panic_aborts_batch() {
        let err = Evaluator::Sequential.evaluate(&Fragile, genomes(), 0).unwrap_err();
        match err {
            EvolutionError::EvaluationAborted(msg) => assert_eq!(msg, "three ones"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_panic_aborts_parallel_batch() {
        let err = Evaluator::parallel().evaluate(&Fragile, genomes(), 0).unwrap_err();
        assert!(matches!(err, EvolutionError::EvaluationAborted(_)));
    }

    #[test]
    fn test_evaluation_error_propagates() {
        let err = Evaluator::Sequential.evaluate(&Failing, genomes(), 0).unwrap_err();
        assert!(matches!(err, EvolutionError::FitnessEvaluation(_)));
    }
}
