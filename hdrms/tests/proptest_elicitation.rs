use hdrms::{
    DimensionSet, ElicitationConfig, Elicitation, GeneralizedBinarySplitter, BudgetLimits, Session,
    SimulatedUser, UtilityVector,
};
use hdrms_geometry::PointSet;
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `n` points with every coordinate in [0.1, 1.0]
fn random_points(n: usize, dim: usize, seed: u64) -> PointSet {
    let mut rng = StdRng::seed_from_u64(seed);
    PointSet::from_rows(
        (0..n)
            .map(|_| (0..dim).map(|_| rng.gen_range(0.1..=1.0)).collect())
            .collect(),
    )
    .unwrap()
}

fn utility_on(dim: usize, support: &[usize]) -> UtilityVector {
    let mut w = vec![0.0; dim];
    for &s in support {
        w[s] = 1.0 / support.len() as f64;
    }
    UtilityVector::new(w)
}

#[test]
fn test_isolates_every_pair_of_dimensions() {
    let data = random_points(20, 32, 5);
    for a in 0..32 {
        for b in (a + 1)..32 {
            let mut user = SimulatedUser::new(utility_on(32, &[a, b]));
            let mut session = Session::new(BudgetLimits::questions(64), 1, &mut user);
            let outcome = GeneralizedBinarySplitter::new(2, 4)
                .run(&data.view(), DimensionSet::full(32), &mut session)
                .unwrap();
            assert_eq!(outcome.final_dimensions.to_vec(), vec![a, b]);
            assert!(session.budget.consumed().questions <= 20, "pair ({}, {})", a, b);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 24,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_budget_is_never_exceeded(seed in 0u64..1000, budget in 0u32..30) {
        let data = random_points(30, 8, seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut user = SimulatedUser::new(UtilityVector::random_sparse(8, 2, &mut rng));
        let mut config = ElicitationConfig::default();
        config.budget = budget;
        config.seed = Some(seed);
        config.narrowing.d_hat = 4;
        config.splitting.d_bar = 2;

        let outcome = Elicitation::new(config).unwrap().run(&data, &mut user).unwrap();

        prop_assert!(outcome.questions.total_questions() <= budget);
        prop_assert!(user.asked() <= budget);
        prop_assert!(!outcome.selected.is_empty());

        let pools = outcome.trace.pool_sizes();
        prop_assert!(pools.windows(2).all(|w| w[0] >= w[1]));
        let candidates = outcome.trace.candidate_sizes();
        prop_assert!(candidates.windows(2).all(|w| w[0] >= w[1]));
        let bounds = outcome.trace.regret_bounds();
        prop_assert!(bounds.windows(2).all(|w| w[0] >= w[1]));

        let mut ids = outcome.selected.ids();
        let before = ids.len();
        ids.dedup();
        prop_assert_eq!(ids.len(), before);
    }
}
