//! End-to-end behavior of the random and annealing searches.

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use u_groupmix::model::{Assignment, Group, Iteration, Participant, PartitionRequest, Population};
use u_groupmix::objective::{CostWeights, ObjectiveFunction};
use u_groupmix::random::RandomPartitioner;
use u_groupmix::sa::{find_neighbor, AnnealingOptimizer, SaConfig};
use u_groupmix::table::{read_participants, write_assignment};
use u_numflow::random::create_rng;

fn fellowship() -> Arc<Population> {
    let rows = vec![
        vec!["gender", "nation", "faculty"],
        vec!["m", "mordor", "1"],
        vec!["m", "gondor", "2"],
        vec!["m", "gondor", "3"],
        vec!["w", "gondor", "3"],
        vec!["w", "lindon", "2"],
        vec!["w", "mordor", "1"],
        vec!["m", "angmar", "2"],
        vec!["w", "rohan", "1"],
        vec!["m", "rohan", "3"],
        vec!["w", "lindon", "1"],
        vec!["m", "shire", "2"],
    ];
    let people = read_participants(&rows, None).unwrap();
    Arc::new(Population::new(people).unwrap())
}

fn synthetic(n: usize) -> Arc<Population> {
    let people = (0..n)
        .map(|i| {
            Participant::new(
                format!("p{i}"),
                [
                    ("gender", ["m", "w"][i % 2].to_string()),
                    ("nation", format!("n{}", i % 5)),
                ],
            )
        })
        .collect();
    Arc::new(Population::new(people).unwrap())
}

fn assert_valid(assignment: &Assignment, request: PartitionRequest) {
    let n = assignment.population().len();
    assert_eq!(assignment.iterations().len(), request.iterations);
    for iteration in assignment.iterations() {
        assert_eq!(iteration.len(), request.groups_per_iteration);
        let members: BTreeSet<_> = iteration.groups().iter().flat_map(Group::iter).collect();
        assert_eq!(members.len(), n);
        assert_eq!(iteration.member_count(), n);

        let sizes: Vec<usize> = iteration.groups().iter().map(Group::len).collect();
        let (min, max) = (sizes.iter().min().unwrap(), sizes.iter().max().unwrap());
        assert!(max - min <= 1, "unbalanced groups {sizes:?}");
    }
}

fn by_uid(population: &Arc<Population>, rounds: &[[[&str; 3]; 2]]) -> Assignment {
    let iterations = rounds
        .iter()
        .map(|round| {
            Iteration::new(
                round
                    .iter()
                    .map(|uids| uids.iter().map(|u| population.find(u).unwrap()).collect())
                    .collect(),
            )
        })
        .collect();
    Assignment::new(Arc::clone(population), iterations).unwrap()
}

#[test]
fn annealing_produces_valid_assignments() {
    let population = fellowship();
    let optimizer = AnnealingOptimizer::new(population.attribute_classes())
        .unwrap()
        .with_config(SaConfig::default().with_max_cycles(300));

    for (groups, iterations) in [(2, 3), (4, 2), (5, 4)] {
        let request = PartitionRequest::new(groups, iterations);
        let assignment = optimizer
            .find_assignment(&population, request, &mut create_rng(11))
            .unwrap();
        assert_valid(&assignment, request);
    }
}

#[test]
fn same_seed_same_assignment() {
    let population = fellowship();
    let optimizer = AnnealingOptimizer::new(population.attribute_classes())
        .unwrap()
        .with_config(SaConfig::default().with_max_cycles(200));
    let request = PartitionRequest::new(3, 3);

    let a = optimizer
        .find_assignment(&population, request, &mut create_rng(2024))
        .unwrap();
    let b = optimizer
        .find_assignment(&population, request, &mut create_rng(2024))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn normalized_costs_stay_in_unit_interval() {
    let population = fellowship();
    let objective = ObjectiveFunction::for_population(&population).unwrap();
    let mut rng = create_rng(5);

    for seed in 0..20 {
        let request = PartitionRequest::new(2 + seed % 4, 2 + seed % 3);
        let assignment = RandomPartitioner::find_assignment(&population, request, &mut rng).unwrap();
        let report = objective.report(&assignment, CostWeights::default()).unwrap();
        for cost in [report.mix_cost, report.diversity_cost, report.weighted_cost] {
            assert!((0.0..=1.0).contains(&cost), "cost {cost} out of range");
        }
    }
}

#[test]
fn reused_optimizer_matches_fresh_one() {
    let population = synthetic(30);
    let request = PartitionRequest::new(5, 3);
    let config = SaConfig::default().with_max_cycles(500);
    let reused = AnnealingOptimizer::new(population.attribute_classes())
        .unwrap()
        .with_config(config.clone());

    for seed in 0..10 {
        reused
            .find_assignment(&population, request, &mut create_rng(777 + seed))
            .unwrap();
        let after_other_run = reused
            .find_assignment(&population, request, &mut create_rng(seed))
            .unwrap();

        let fresh = AnnealingOptimizer::new(population.attribute_classes())
            .unwrap()
            .with_config(config.clone())
            .find_assignment(&population, request, &mut create_rng(seed))
            .unwrap();
        assert_eq!(after_other_run, fresh, "seed {seed} depends on optimizer history");
    }
}

#[test]
fn annealing_beats_random_restarts() {
    let population = fellowship();
    let request = PartitionRequest::new(4, 3);
    let objective = ObjectiveFunction::for_population(&population).unwrap();
    let optimizer = AnnealingOptimizer::new(population.attribute_classes())
        .unwrap()
        .with_config(SaConfig::default().with_max_cycles(100));

    let seeds = 30;
    let (mut annealed, mut sampled) = (0.0, 0.0);
    for seed in 0..seeds {
        let a = optimizer
            .find_assignment(&population, request, &mut create_rng(seed))
            .unwrap();
        let b = RandomPartitioner::brute_force_assignment(
            &population,
            request,
            500,
            &mut create_rng(seed),
        )
        .unwrap();
        annealed += objective.calculate_weighted_cost(&a, CostWeights::default()).unwrap();
        sampled += objective.calculate_weighted_cost(&b, CostWeights::default()).unwrap();
    }
    assert!(
        annealed <= sampled,
        "annealing mean {} worse than random restarts {}",
        annealed / seeds as f64,
        sampled / seeds as f64
    );
}

#[test]
fn segregated_groups_score_worse_diversity() {
    let people = ["a", "b", "c", "x", "y", "z"]
        .iter()
        .enumerate()
        .map(|(i, uid)| Participant::new(*uid, [("gender", if i < 3 { "m" } else { "w" })]))
        .collect();
    let population = Arc::new(Population::new(people).unwrap());
    let objective = ObjectiveFunction::new(["gender"]).unwrap();

    let segregated = by_uid(
        &population,
        &[[["a", "b", "c"], ["x", "y", "z"]], [["a", "b", "c"], ["x", "y", "z"]]],
    );
    let mixed_repeated = by_uid(
        &population,
        &[[["a", "b", "x"], ["c", "y", "z"]], [["a", "b", "x"], ["c", "y", "z"]]],
    );
    let mixed_rotated = by_uid(
        &population,
        &[[["a", "b", "x"], ["c", "y", "z"]], [["a", "c", "y"], ["b", "x", "z"]]],
    );

    let d_seg = objective.diversity_cost(&segregated).unwrap();
    let d_mix = objective.diversity_cost(&mixed_repeated).unwrap();
    assert!(d_seg > d_mix);

    let m_seg = objective.mix_cost(&segregated).unwrap();
    let m_mix = objective.mix_cost(&mixed_repeated).unwrap();
    assert!((m_seg - m_mix).abs() < 1e-12);
    assert!(objective.mix_cost(&mixed_rotated).unwrap() < m_mix);
}

#[test]
fn table_round_trip_keeps_every_member() {
    let population = fellowship();
    let request = PartitionRequest::new(3, 2);
    let assignment = RandomPartitioner::find_assignment(&population, request, &mut create_rng(3)).unwrap();
    let rows = write_assignment(&assignment, None);

    let member_rows = rows
        .iter()
        .filter(|r| r.cells.len() == 4 && r.cells[0] != "Group")
        .count();
    assert_eq!(member_rows, population.len() * request.iterations);
}

proptest! {
    #[test]
    fn random_partitions_are_balanced(
        n in 4usize..30,
        groups_seed in 0usize..100,
        iterations in 1usize..5,
        seed in any::<u64>(),
    ) {
        let population = synthetic(n);
        let groups = 1 + groups_seed % n;
        let request = PartitionRequest::new(groups, iterations);
        let assignment = RandomPartitioner::find_assignment(&population, request, &mut create_rng(seed)).unwrap();
        assert_valid(&assignment, request);
    }

    #[test]
    fn neighbor_swaps_one_pair(
        n in 4usize..20,
        groups_seed in 0usize..100,
        iterations in 2usize..5,
        seed in any::<u64>(),
    ) {
        let population = synthetic(n);
        let groups = 2 + groups_seed % (n - 2);
        let request = PartitionRequest::new(groups, iterations);
        let mut rng = create_rng(seed);
        let before = RandomPartitioner::find_assignment(&population, request, &mut rng).unwrap();
        let after = find_neighbor(&before, &mut rng);

        let changed: Vec<usize> = (0..iterations)
            .filter(|&k| before.iterations()[k] != after.iterations()[k])
            .collect();
        prop_assert_eq!(changed.len(), 1);

        let k = changed[0];
        let pairs: Vec<(&Group, &Group)> = before.iterations()[k]
            .groups()
            .iter()
            .zip(after.iterations()[k].groups())
            .filter(|(b, a)| b != a)
            .collect();
        prop_assert_eq!(pairs.len(), 2);
        for (b, a) in pairs {
            prop_assert_eq!(b.len(), a.len());
            prop_assert_eq!(b.overlap(a), b.len() - 1);
        }
    }
}
