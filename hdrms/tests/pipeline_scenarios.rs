use hdrms::{
    ElicitationConfig, Elicitation, FinalSelection, SimulatedUser, TraceEvent, UtilityVector,
};
use hdrms_geometry::{skyline, PointId, PointSet};
use pretty_assertions::assert_eq;

fn ten_points() -> PointSet {
    PointSet::from_rows(vec![
        vec![0.9, 0.2, 0.5, 0.1],
        vec![0.8, 0.6, 0.2, 0.9],
        vec![0.5, 0.9, 0.7, 0.3],
        vec![0.3, 0.95, 0.1, 0.8],
        vec![0.6, 0.5, 0.9, 0.9],
        vec![0.95, 0.1, 0.3, 0.2],
        vec![0.4, 0.4, 0.6, 0.6],
        vec![0.7, 0.7, 0.4, 0.5],
        vec![0.2, 0.3, 0.8, 0.7],
        vec![0.1, 1.0, 0.2, 0.1],
    ])
    .unwrap()
}

fn six_dim_points() -> PointSet {
    PointSet::from_rows(
        (0..40)
            .map(|i| {
                (0..6)
                    .map(|d| 0.05 + ((i * 11 + d * 5 + i * d * 3) % 19) as f64 / 19.0)
                    .collect()
            })
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_small_scenario_finds_true_favourite() {
    let data = ten_points();
    let mut config = ElicitationConfig::default();
    config.budget = 10;
    config.seed = Some(17);
    config.narrowing.d_hat = 2;
    config.splitting.d_bar = 2;
    let mut user = SimulatedUser::new(UtilityVector::new(vec![0.7, 0.3, 0.0, 0.0]));

    let outcome = Elicitation::new(config).unwrap().run(&data, &mut user).unwrap();

    assert_eq!(outcome.final_dimensions.to_vec(), vec![0, 1]);
    assert_eq!(outcome.questions.narrowing, 2);
    assert!(outcome.questions.splitting <= 2);
    assert!(outcome.questions.total_questions() <= 10);
    assert_eq!(outcome.selected.ids(), vec![PointId(1)]);
    assert!(matches!(outcome.selection, FinalSelection::Interactive { .. }));

    let dropped: Vec<&Vec<usize>> = outcome
        .trace
        .events
        .iter()
        .filter_map(|e| match e {
            TraceEvent::BlockTested { dims, kept: false, .. } => Some(dims),
            _ => None,
        })
        .collect();
    assert_eq!(dropped, vec![&vec![2, 3]]);
}

#[test]
fn test_zero_budget_falls_back_to_subset() {
    let data = six_dim_points();
    let mut config = ElicitationConfig::default();
    config.budget = 0;
    config.seed = Some(3);
    config.subset.rounds = 5;
    config.subset.output_size = 5;
    let mut user = SimulatedUser::new(UtilityVector::new(vec![1.0 / 6.0; 6]));

    let outcome = Elicitation::new(config).unwrap().run(&data, &mut user).unwrap();

    let sky = skyline(&data);
    assert_eq!(outcome.final_dimensions.len(), 6);
    assert_eq!(outcome.questions.total_questions(), 0);
    assert_eq!(outcome.selection, FinalSelection::Covering { rounds_run: 5 });
    assert!(!outcome.selected.is_empty());
    assert!(outcome.selected.len() <= sky.len());

    let mut ids = outcome.selected.ids();
    let before = ids.len();
    ids.dedup();
    assert_eq!(ids.len(), before);
    assert!(outcome.selected.iter().all(|p| sky.find(p.id()).is_some()));
}

#[test]
fn test_same_seed_same_outcome() {
    let data = six_dim_points();
    let mut config = ElicitationConfig::default();
    config.budget = 12;
    config.seed = Some(99);
    config.narrowing.d_hat = 3;
    let utility = UtilityVector::new(vec![0.0, 0.6, 0.0, 0.0, 0.4, 0.0]);

    let run = || {
        let mut user = SimulatedUser::new(utility.clone());
        let outcome = Elicitation::new(config.clone()).unwrap().run(&data, &mut user).unwrap();
        (outcome.selected.ids(), outcome.final_dimensions.to_vec(), outcome.questions)
    };
    assert_eq!(run(), run());
}
