use fleur::{
    BarLayout, BarOptions, BarPlotOptions, BarStats, BetweenOptions, BetweenPlotOptions,
    BetweenStats, Bins, InputData, Orientation, ScatterOptions, ScatterPlotOptions, ScatterStats,
    load_iris, load_mtcars,
};
use std::fs;
use std::path::{Path, PathBuf};

fn write_and_check<F: Fn(&Path)>(maker: F, name: &str) {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join(name);
    maker(&path);
    let meta = fs::metadata(&path).expect("file created");
    assert!(meta.len() > 0, "{name} has content");
}

fn iris_between() -> BetweenStats {
    let df = load_iris().unwrap();
    let data = InputData::new("species", "sepal_length", Some(&df)).unwrap();
    BetweenStats::new(&data, &BetweenOptions::default()).unwrap()
}

fn mtcars_bar() -> BarStats {
    let df = load_mtcars().unwrap();
    let data = InputData::new("cyl", "gear", Some(&df)).unwrap();
    BarStats::new(&data, &BarOptions::default()).unwrap()
}

fn mtcars_scatter() -> ScatterStats {
    let df = load_mtcars().unwrap();
    let data = InputData::new("wt", "mpg", Some(&df)).unwrap();
    ScatterStats::new(&data, &ScatterOptions::default()).unwrap()
}

#[test]
fn between_plots_in_both_orientations() {
    let stats = iris_between();
    write_and_check(
        |p| stats.plot(p, &BetweenPlotOptions::default()).unwrap(),
        "between.svg",
    );
    let horizontal = BetweenPlotOptions {
        orientation: Orientation::Horizontal,
        violin: false,
        ..Default::default()
    };
    write_and_check(|p| stats.plot(p, &horizontal).unwrap(), "between_h.png");
}

#[test]
fn between_svg_carries_the_annotation() {
    let stats = iris_between();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("annotated.svg");
    stats.plot(&path, &BetweenPlotOptions::default()).unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains("F(2, 147) = 119.26"));
    assert!(svg.contains("setosa, n = 50"));
}

#[test]
fn too_few_colors_fail_before_drawing() {
    let stats = iris_between();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("never.svg");
    let opts = BetweenPlotOptions {
        colors: Some(vec!["red".into(), "blue".into()]),
        ..Default::default()
    };
    let err = stats.plot(&path, &opts).unwrap_err();
    assert_eq!(
        err.to_string(),
        "`colors` argument must have at least 3 elements, not 2"
    );
    assert!(!path.exists());
}

#[test]
fn bar_layouts_render() {
    let stats = mtcars_bar();
    for (layout, name) in [(BarLayout::Stacked, "stacked.svg"), (BarLayout::Grouped, "grouped.png")] {
        let opts = BarPlotOptions {
            layout,
            show_counts: true,
            ..Default::default()
        };
        write_and_check(|p| stats.plot(p, &opts).unwrap(), name);
    }
    let horizontal = BarPlotOptions {
        orientation: Orientation::Horizontal,
        colors: Some(vec!["#1b9e77".into(), "#d95f02".into(), "#7570b3".into()]),
        ..Default::default()
    };
    write_and_check(|p| stats.plot(p, &horizontal).unwrap(), "bar_h.svg");
}

#[test]
fn scatter_with_and_without_marginals() {
    let stats = mtcars_scatter();
    let opts = ScatterPlotOptions {
        bins: Some(Bins::Pair([8, 10])),
        hist_color: Some("tab:green".into()),
        ..Default::default()
    };
    write_and_check(|p| stats.plot(p, &opts).unwrap(), "scatter.svg");
    let plain = ScatterPlotOptions {
        marginal: false,
        show_stats: false,
        ..Default::default()
    };
    write_and_check(|p| stats.plot(p, &plain).unwrap(), "scatter_plain.png");
}

#[test]
fn scatter_svg_carries_the_model() {
    let stats = mtcars_scatter();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.svg");
    stats.plot(&path, &ScatterPlotOptions::default()).unwrap();
    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.contains("37.29 - 5.34x"));
}
