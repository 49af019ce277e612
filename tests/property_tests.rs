//! Property-based tests for edaf
//!
//! Uses proptest to verify invariants and properties of the library.

use edaf::prelude::*;
use proptest::prelude::*;

fn bit_population(rows: &[Vec<bool>]) -> Population<BitString> {
    Population::from_genomes(
        rows.iter().cloned().map(BitString::new).collect(),
        ObjectiveSense::Maximize,
        0,
    )
}

fn rows_strategy() -> impl Strategy<Value = Vec<Vec<bool>>> {
    (2usize..8).prop_flat_map(|len| {
        prop::collection::vec(prop::collection::vec(any::<bool>(), len), 1..40)
    })
}

proptest! {
    // ==================== Genome Properties ====================

    #[test]
    fn real_vector_distance_symmetric(
        genes1 in prop::collection::vec(-10.0..10.0f64, 5),
        genes2 in prop::collection::vec(-10.0..10.0f64, 5)
    ) {
        let g1 = RealVector::new(genes1);
        let g2 = RealVector::new(genes2);
        prop_assert!((g1.distance(&g2) - g2.distance(&g1)).abs() < 1e-10);
        prop_assert!(g1.distance(&g2) >= 0.0);
        prop_assert!(g1.distance(&g1).abs() < 1e-10);
    }

    #[test]
    fn bit_string_count_consistency(bits in prop::collection::vec(any::<bool>(), 1..100)) {
        let genome = BitString::new(bits.clone());
        prop_assert_eq!(genome.count_ones() + genome.count_zeros(), bits.len());
    }

    #[test]
    fn bit_string_text_form(bits in prop::collection::vec(any::<bool>(), 1..64)) {
        let genome = BitString::new(bits);
        let parsed: BitString = genome.to_string().parse().unwrap();
        prop_assert_eq!(parsed, genome);
    }

    // ==================== Bounds Properties ====================

    #[test]
    fn bounds_clamp_within_range(
        min in -100.0..0.0f64,
        max in 0.1..100.0f64,
        value in -200.0..200.0f64
    ) {
        let bounds = Bounds::new(min, max);
        let clamped = bounds.clamp(value);
        prop_assert!(clamped >= min && clamped <= max);
        prop_assert!(bounds.contains(clamped));
    }

    // ==================== Representation Properties ====================

    #[test]
    fn bit_string_representation_random_is_valid(len in 1usize..100, seed in any::<u64>()) {
        let rep = BitStringRepresentation::new(len);
        let genome = rep.random(&mut RngStream::from_seed(seed));
        prop_assert_eq!(genome.len(), len);
        prop_assert!(rep.is_valid(&genome));
    }

    #[test]
    fn real_representation_repair_is_valid(
        genes in prop::collection::vec(-50.0..50.0f64, 0..12),
        half_width in 0.1f64..20.0
    ) {
        let rep = RealVectorRepresentation::new(MultiBounds::symmetric(half_width, 6));
        let repaired = rep.repair(RealVector::new(genes));
        prop_assert_eq!(repaired.len(), 6);
        prop_assert!(rep.is_valid(&repaired));
    }

    // ==================== Selection Properties ====================

    #[test]
    fn truncation_selection_is_idempotent(
        fitness in prop::collection::vec(-100.0..100.0f64, 1..60),
        count in 1usize..60,
        maximize in any::<bool>()
    ) {
        let sense = if maximize { ObjectiveSense::Maximize } else { ObjectiveSense::Minimize };
        let pop = Population::from_individuals(
            fitness
                .iter()
                .enumerate()
                .map(|(i, &f)| Individual::with_fitness(RealVector::new(vec![i as f64]), f))
                .collect(),
            sense,
        );
        let mut rng = RngStream::from_seed(0);
        let once = TruncationSelection.select(&pop, count, &mut rng);
        let twice = TruncationSelection.select(&once, count, &mut rng);
        prop_assert_eq!(once.len(), count.min(pop.len()));
        let a: Vec<f64> = once.iter().map(|i| i.genome[0]).collect();
        let b: Vec<f64> = twice.iter().map(|i| i.genome[0]).collect();
        prop_assert_eq!(a, b);

        // Nothing left behind beats anything selected
        if let Some(worst_kept) = once.worst() {
            let kept: Vec<f64> = once.iter().map(|i| i.genome[0]).collect();
            for ind in pop.iter().filter(|i| !kept.contains(&i.genome[0])) {
                prop_assert!(!ind.is_better_than(worst_kept, sense));
            }
        }
    }

    #[test]
    fn population_best_is_best(fitness in prop::collection::vec(-100.0..100.0f64, 1..40)) {
        for sense in [ObjectiveSense::Minimize, ObjectiveSense::Maximize] {
            let pop = Population::from_individuals(
                fitness
                    .iter()
                    .map(|&f| Individual::with_fitness(RealVector::new(vec![f]), f))
                    .collect(),
                sense,
            );
            let best = pop.best().unwrap();
            for ind in pop.iter() {
                prop_assert!(!ind.is_better_than(best, sense));
            }
        }
    }

    // ==================== Model Properties ====================

    #[test]
    fn independent_probabilities_are_well_formed(rows in rows_strategy(), smoothing in 0.0f64..3.0) {
        let pop = bit_population(&rows);
        let rep = BitStringRepresentation::new(rows[0].len());
        let mut model = IndependentModel::new(smoothing);
        Model::<BitString>::fit(&mut model, &pop, &rep, &mut RngStream::from_seed(1)).unwrap();
        for &p in model.probabilities().unwrap() {
            prop_assert!(p.is_finite() && (0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn tree_models_are_spanning_trees(rows in rows_strategy(), pick in 0usize..4) {
        let pop = bit_population(&rows);
        let len = rows[0].len();
        let rep = BitStringRepresentation::new(len);
        let mut model = match pick {
            0 => DependencyTreeModel::mimic(1.0),
            1 => DependencyTreeModel::chow_liu(1.0),
            2 => DependencyTreeModel::bmda(1.0),
            _ => DependencyTreeModel::linkage_tree_model(1.0),
        };
        Model::<BitString>::fit(&mut model, &pop, &rep, &mut RngStream::from_seed(1)).unwrap();
        let structure = model.structure().unwrap();
        prop_assert!(structure.is_topologically_ordered());
        prop_assert_eq!(structure.edge_count(), len - 1);
        prop_assert!(structure.max_in_degree() <= 1);
        for table in model.network().unwrap().tables() {
            for &p in table.probabilities() {
                prop_assert!(p > 0.0 && p < 1.0);
            }
        }
    }

    #[test]
    fn sparse_network_is_bounded_dag(rows in rows_strategy(), k in 0usize..4) {
        let pop = bit_population(&rows);
        let rep = BitStringRepresentation::new(rows[0].len());
        let mut model = SparseNetworkModel::new(k, 1.0).with_complexity_penalty(0.0);
        Model::<BitString>::fit(&mut model, &pop, &rep, &mut RngStream::from_seed(1)).unwrap();
        let structure = model.structure().unwrap();
        prop_assert!(structure.is_topologically_ordered());
        prop_assert!(structure.max_in_degree() <= k);
    }

    #[test]
    fn snes_utilities_are_zero_centred(lambda in 1usize..500) {
        let u = utilities(lambda);
        prop_assert_eq!(u.len(), lambda);
        prop_assert!(u.iter().sum::<f64>().abs() < 1e-9);
        prop_assert!(u.iter().all(|x| x.is_finite()));
    }

    // ==================== Fitness Function Properties ====================

    #[test]
    fn sphere_fitness_at_origin_is_optimal(dim in 1usize..20) {
        let fitness = Sphere::new(dim);
        prop_assert!(fitness.evaluate(&RealVector::new(vec![0.0; dim])).abs() < 1e-10);
    }

    #[test]
    fn rastrigin_has_global_minimum_at_origin(dim in 1usize..10, offset in 0.05f64..0.45) {
        let fitness = Rastrigin::new(dim);
        let at_origin = fitness.evaluate(&RealVector::new(vec![0.0; dim]));
        let at_nearby = fitness.evaluate(&RealVector::new(vec![offset; dim]));
        prop_assert!(at_origin < at_nearby);
    }

    #[test]
    fn trap_optimum_is_all_ones(bits in prop::collection::vec(any::<bool>(), 1..40), k in 1usize..6) {
        let trap = DeceptiveTrap::new(k);
        let len = bits.len();
        let optimum = trap.evaluate(&BitString::ones(len));
        prop_assert_eq!(optimum, len as f64);
        prop_assert!(trap.evaluate(&BitString::new(bits)) <= optimum);
    }
}
