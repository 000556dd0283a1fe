use fleur::{Alternative, Correlation, InputData, ScatterOptions, ScatterStats, load_mtcars};

fn weight_vs_mileage(options: &ScatterOptions) -> ScatterStats {
    let df = load_mtcars().unwrap();
    let data = InputData::new("wt", "mpg", Some(&df)).unwrap();
    ScatterStats::new(&data, options).unwrap()
}

#[test]
fn heavier_cars_use_more_fuel() {
    let s = weight_vs_mileage(&ScatterOptions::default());
    assert_eq!((s.n_obs, s.dof), (32, 30));
    assert!((s.slope + 5.344_471_572_722_675).abs() < 1e-9);
    assert!((s.intercept - 37.285_126_167_342_01).abs() < 1e-9);
    assert!((s.correlation + 0.867_659_376_517_227_7).abs() < 1e-9);
    assert!(s.ci_lower < s.slope && s.slope < s.ci_upper && s.ci_upper < 0.0);
    assert!(s.pvalue < 1e-9);
    assert_eq!(s.expression_model, "ŷ = 37.29 - 5.34x");
    assert!(s.summary().starts_with("Correlation stats\n\nTest: Student t test"));
}

#[test]
fn one_sided_and_rank_coefficients() {
    let greater = weight_vs_mileage(&ScatterOptions {
        alternative: Alternative::Greater,
        ..Default::default()
    });
    // A negative slope gives no evidence for a positive one.
    assert!(greater.pvalue > 0.99);

    let spearman = weight_vs_mileage(&ScatterOptions {
        effect_size: Correlation::Spearman,
        ..Default::default()
    });
    assert!(spearman.correlation < -0.8);
    assert!(spearman.expression.contains("\\rho_{Spearman}"));
}

#[test]
fn categorical_column_is_rejected() {
    let df = load_mtcars().unwrap();
    let data = InputData::new("model", "mpg", Some(&df)).unwrap();
    let err = ScatterStats::new(&data, &ScatterOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), "Column `model` must be numerical");
}
