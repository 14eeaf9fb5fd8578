use arbores_arg::{
    coalescent_log_density, likelihood, smc_prior, GenomeData, LocalTree, Parameters, PathState,
    PathViolation, SprOp,
};

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("h{i}")).collect()
}

fn caterpillar() -> LocalTree {
    LocalTree::caterpillar(&[0, 1, 2, 3], &[0.5, 1.0, 2.0])
}

#[test]
fn monomorphic_sites_only_pay_total_length() {
    let data = GenomeData::new("flat", names(4), vec![vec![0, 0, 0]; 4]).unwrap();
    let path = PathState::from_tree(3, caterpillar());
    let params = Parameters::new(0.2, 0.1);
    let lik = likelihood(&path, &data, &params).unwrap();
    let expected = -0.2 * 5.5;
    for value in &lik.per_site {
        assert!((value - expected).abs() < 1e-12);
    }
    assert!((lik.log_likelihood - 3.0 * expected).abs() < 1e-12);
}

#[test]
fn polymorphic_site_uses_explaining_branch() {
    // derived {0,1} sits on the edge above node 4 (length 0.5)
    let matrix = vec![vec![1], vec![1], vec![0], vec![0]];
    let data = GenomeData::new("one", names(4), matrix).unwrap();
    let path = PathState::from_tree(1, caterpillar());
    let params = Parameters::new(1.0, 1.0);
    let lik = likelihood(&path, &data, &params).unwrap();
    assert!((lik.log_likelihood - (0.5f64.ln() - 5.5)).abs() < 1e-12);
}

#[test]
fn unexplained_site_is_incompatible() {
    let matrix = vec![vec![1], vec![0], vec![1], vec![0]];
    let data = GenomeData::new("clash", names(4), matrix).unwrap();
    let path = PathState::from_tree(1, caterpillar());
    let lik = likelihood(&path, &data, &Parameters::default()).unwrap();
    assert_eq!(lik.log_likelihood, f64::NEG_INFINITY);
    assert_eq!(
        path.check_compatible(&data),
        Err(PathViolation::Incompatible { site: 0 })
    );
}

#[test]
fn shape_mismatch_is_reported_before_sites() {
    let data = GenomeData::new("short", names(4), vec![vec![0, 0]; 4]).unwrap();
    let path = PathState::from_tree(3, caterpillar());
    assert!(matches!(
        path.check_compatible(&data),
        Err(PathViolation::ShapeMismatch { .. })
    ));
}

#[test]
fn prior_splits_into_coalescent_and_recombination_terms() {
    let data = GenomeData::new("flat", names(4), vec![vec![0, 0, 0, 0]; 4]).unwrap();
    let op = SprOp {
        site: 2,
        node: 0,
        cut_time: 0.2,
        target: 3,
        join_time: 1.5,
    };
    let path = PathState::new(4, caterpillar(), vec![op]);
    let params = Parameters::new(1.0, 0.5);
    let prior = smc_prior(&path, &params, &data).unwrap();

    assert_eq!(prior.number_of_recombinations, 1);
    assert!((prior.coalescent_density - coalescent_log_density(&caterpillar(), 1.0)).abs() < 1e-12);
    assert!((prior.density - prior.coalescent_density - prior.recombination_density).abs() < 1e-12);

    let recombined = path.tree_at(2).unwrap();
    // floating lineage sees 3 pruned lineages on [0.2, 1.0) and 2 on [1.0, 1.5)
    let exposure = 3.0 * 0.8 + 2.0 * 0.5;
    let expected = -0.5 * 5.5 * 2.0 - 0.5 * recombined.total_length() * 1.0 + 0.5f64.ln() - exposure;
    assert!((prior.recombination_density - expected).abs() < 1e-9);
}

#[test]
fn path_without_recombination_pays_survival_per_boundary() {
    let data = GenomeData::new("flat", names(4), vec![vec![0; 5]; 4]).unwrap();
    let path = PathState::from_tree(5, caterpillar());
    let prior = smc_prior(&path, &Parameters::new(1.0, 0.1), &data).unwrap();
    assert!((prior.recombination_density + 0.1 * 5.5 * 4.0).abs() < 1e-12);
}
