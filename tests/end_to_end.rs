//! Full runs through the generational driver

use edaf::prelude::*;
use tracing::Level;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
}

#[test]
fn onemax_with_univariate_model() {
    init_tracing();
    let mut eda = Eda::builder()
        .problem(OneMax)
        .representation(BitStringRepresentation::new(20))
        .model(IndependentModel::default())
        .selection(TruncationSelection)
        .population_size(100)
        .selection_size(50)
        .max_generations(50)
        .seed(2024)
        .build()
        .unwrap();
    let result = eda.run().unwrap();

    assert!(result.best_fitness() >= 15.0, "{}", result.stats.summary());
    assert_eq!(result.best_genome().len(), 20);
    assert_eq!(result.population.len(), 100);
    assert!(result.generations <= 50);
}

#[test]
fn every_discrete_kind_solves_onemax() {
    init_tracing();
    for kind in ModelKind::ALL.into_iter().filter(|k| k.is_discrete()) {
        let model = kind.binary_model(&ModelSettings::default()).unwrap();
        let mut eda = Eda::builder()
            .problem(OneMax)
            .representation(BitStringRepresentation::new(20))
            .model(model)
            .selection(TournamentSelection::new(2))
            .population_size(100)
            .selection_size(50)
            .max_generations(30)
            .seed(31)
            .build()
            .unwrap();
        let result = eda.run().unwrap();
        assert!(result.best_fitness() >= 15.0, "{kind}: {}", result.stats.summary());
    }
}

#[test]
fn snes_improves_on_sphere() {
    init_tracing();
    let mut eda = Eda::builder()
        .problem(Sphere::new(5))
        .representation(RealVectorRepresentation::uniform(5, -5.12, 5.12))
        .model(SeparableNesModel::new())
        .selection(TruncationSelection)
        .population_size(50)
        .selection_size(50)
        .max_generations(100)
        .seed(77)
        .build()
        .unwrap();
    let result = eda.run().unwrap();

    let history = result.stats.best_fitness_history();
    assert_eq!(history.len(), 101);
    assert!(result.best_fitness() < history[0]);
    assert_eq!(result.stats.model_metric_history("dimension").last(), Some(&5.0));
}

#[test]
fn population_best_never_worsens_under_elitism() {
    for policy in [ElitismPolicy::PreserveBest(1), ElitismPolicy::ReplaceWorstIfBetter] {
        let mut eda = Eda::builder()
            .problem(DeceptiveTrap::new(4))
            .representation(BitStringRepresentation::new(16))
            .model(DependencyTreeModel::chow_liu(1.0))
            .selection(TruncationSelection)
            .population_size(60)
            .selection_size(30)
            .elitism(policy)
            .max_generations(25)
            .seed(13)
            .build()
            .unwrap();
        let result = eda.run().unwrap();
        let history = result.stats.best_fitness_history();
        assert!(history.windows(2).all(|w| w[1] >= w[0]), "{policy:?}: {history:?}");
    }
}

#[test]
fn minimization_tracks_lowest_value() {
    let mut eda = Eda::builder()
        .problem(Rastrigin::new(2))
        .representation(RealVectorRepresentation::uniform(2, -5.12, 5.12))
        .model(DiagonalGaussianModel::new(1.0e-6))
        .selection(TruncationSelection)
        .population_size(80)
        .selection_size(30)
        .max_generations(20)
        .seed(5)
        .build()
        .unwrap();
    let result = eda.run().unwrap();
    let lowest = result
        .population
        .iter()
        .map(|i| i.fitness_f64())
        .fold(f64::INFINITY, f64::min);
    assert!(result.best_fitness() <= lowest);
    assert_eq!(result.stats.sense, ObjectiveSense::Minimize);
}

#[test]
fn rejection_keeps_knapsack_solutions_feasible() {
    let knapsack = Knapsack::new(
        vec![12, 7, 11, 8, 9, 6, 5, 14, 3, 10],
        vec![24, 13, 23, 15, 16, 11, 9, 30, 4, 19],
        40,
        10.0,
    );
    let mut eda = Eda::builder()
        .problem(knapsack.clone())
        .representation(BitStringRepresentation::new(10))
        .model(SparseNetworkModel::new(2, 1.0))
        .selection(TruncationSelection)
        .constraint(RejectionConstraint::new(50))
        .population_size(60)
        .selection_size(30)
        .max_generations(20)
        .seed(17)
        .build()
        .unwrap();
    let result = eda.run().unwrap();
    assert!(Problem::is_feasible(&knapsack, result.best_genome()));
    assert!(result.best_fitness() > 0.0);
}

#[test]
fn missing_model_is_a_configuration_error() {
    let built = Eda::<OneMax, IndependentModel, TruncationSelection>::builder()
        .problem(OneMax)
        .representation(BitStringRepresentation::new(8))
        .selection(TruncationSelection)
        .build();
    match built {
        Err(EvolutionError::Configuration(msg)) => assert_eq!(msg, "Model must be specified"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("build should fail without a model"),
    }
}

#[test]
fn mismatched_model_kind_is_rejected() {
    let err = ModelKind::Snes.binary_model(&ModelSettings::default()).unwrap_err();
    assert!(matches!(err, EvolutionError::Configuration(_)));
    assert!("no-such-model".parse::<ModelKind>().is_err());
}
