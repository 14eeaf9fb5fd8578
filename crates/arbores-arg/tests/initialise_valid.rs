use arbores_arg::{initialise, likelihood, smc_prior, GenomeData, Parameters};
use proptest::prelude::*;

fn genome(rows: Vec<Vec<bool>>) -> GenomeData {
    let names = (0..rows.len()).map(|i| format!("s{i}")).collect();
    let matrix = rows
        .into_iter()
        .map(|row| row.into_iter().map(u8::from).collect())
        .collect();
    GenomeData::new("random", names, matrix).unwrap()
}

fn matrix_strategy() -> impl Strategy<Value = Vec<Vec<bool>>> {
    (2usize..7, 1usize..12).prop_flat_map(|(samples, sites)| {
        prop::collection::vec(prop::collection::vec(any::<bool>(), sites), samples)
    })
}

proptest! {
    #[test]
    fn initial_path_is_complete_and_compatible(rows in matrix_strategy()) {
        let data = genome(rows);
        let params = Parameters::new(0.5, 0.3);
        let path = initialise(&data, &params).unwrap();

        prop_assert!(path.check_complete().is_ok());
        prop_assert!(path.check_compatible(&data).is_ok());
        prop_assert_eq!(path.n_leaves(), data.n_samples());
        prop_assert_eq!(path.n_sites(), data.n_sites());
        for op in path.ops() {
            prop_assert!(op.site >= 1 && op.site < data.n_sites());
        }

        let lik = likelihood(&path, &data, &params).unwrap();
        prop_assert!(lik.log_likelihood.is_finite());
        let prior = smc_prior(&path, &params, &data).unwrap();
        prop_assert!(prior.density.is_finite());
        prop_assert_eq!(prior.number_of_recombinations, path.number_of_recombinations());
    }

    #[test]
    fn augmentation_is_idempotent(rows in matrix_strategy()) {
        let data = genome(rows);
        let path = initialise(&data, &Parameters::default()).unwrap();

        let once = data.augment_with_non_segregating_sites(&path);
        let twice = once.augment_with_non_segregating_sites(&path);
        prop_assert_eq!(&once, &twice);
        for site in path.recombination_sites() {
            prop_assert!(once.segregating_sites().contains(&site));
        }
        prop_assert!(path.check_compatible(&once).is_ok());
    }
}

#[test]
fn monomorphic_data_needs_no_recombination() {
    let data = genome(vec![vec![false; 5], vec![false; 5], vec![false; 5]]);
    let path = initialise(&data, &Parameters::default()).unwrap();
    assert_eq!(path.number_of_recombinations(), 0);
    assert_eq!(path.path_len(), 1);
    assert_eq!(data.augment_with_non_segregating_sites(&path), data);
}

#[test]
fn conflicting_sites_force_recombination() {
    // {0,1} then {0,2,4}: the second split needs two regrafts, the first of
    // which lands on the monomorphic middle site
    let data = genome(vec![
        vec![true, false, true],
        vec![true, false, false],
        vec![false, false, true],
        vec![false, false, false],
        vec![false, false, true],
        vec![false, false, false],
    ]);
    let path = initialise(&data, &Parameters::default()).unwrap();
    assert_eq!(path.number_of_recombinations(), 2);
    assert_eq!(path.ops()[0].site, 1);
    assert_eq!(path.ops()[1].site, 2);
    path.check_compatible(&data).unwrap();

    let augmented = data.augment_with_non_segregating_sites(&path);
    assert_eq!(augmented.augmented_sites(), &[1]);
    assert_eq!(augmented.segregating_sites(), &[0, 1, 2]);
}
