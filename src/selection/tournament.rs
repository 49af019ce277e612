//! Tournament selection

use rand::seq::index::sample;
use rand::Rng;

use crate::fitness::traits::FitnessValue;
use crate::genome::traits::EvolutionaryGenome;
use crate::population::population::Population;
use crate::selection::{gather, Selection};

/// Runs `count` independent tournaments, each over `tournament_size`
/// distinct individuals, and keeps every winner (with replacement across
/// tournaments).
#[derive(Clone, Copy, Debug)]
pub struct TournamentSelection {
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Tournament size is clamped to at least 1
    pub fn new(tournament_size: usize) -> Self {
        Self {
            tournament_size: tournament_size.max(1),
        }
    }

    /// Binary tournament
    pub fn binary() -> Self {
        Self::new(2)
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self::binary()
    }
}

impl Selection for TournamentSelection {
    fn name(&self) -> &'static str {
        "tournament"
    }

    fn select<G, F, R>(
        &self,
        population: &Population<G, F>,
        count: usize,
        rng: &mut R,
    ) -> Population<G, F>
    where
        G: EvolutionaryGenome,
        F: FitnessValue,
        R: Rng,
    {
        let n = population.len();
        if n == 0 {
            return gather(population, &[]);
        }
        let size = self.tournament_size.min(n);
        let sense = population.sense();

        let winners: Vec<usize> = (0..count)
            .map(|_| {
                let mut contenders = sample(rng, n, size).into_vec();
                // Equal fitness goes to the lower index
                contenders.sort_unstable();
                contenders
                    .into_iter()
                    .reduce(|best, c| {
                        if population[c].is_better_than(&population[best], sense) {
                            c
                        } else {
                            best
                        }
                    })
                    .unwrap_or(0)
            })
            .collect();

        gather(population, &winners)
    }
}
