use vantage::binning::{BinMode, BinParams, BinStrategy, HistogramPreview, NullHandling};

#[test]
fn test_preview_bars_match_bins() {
    let sample: Vec<Option<f64>> = (0..100).map(|i| Some(f64::from(i))).collect();
    let params = BinParams::new(BinMode::Quantiles { bins: 4 });
    let preview = HistogramPreview::build(&sample, &params).unwrap();

    assert_eq!(preview.strategy, BinStrategy::Quantiles);
    assert_eq!(preview.sample_size, 100);
    assert_eq!(
        preview.bars.iter().map(|b| b.count).collect::<Vec<_>>(),
        vec![25, 25, 25, 25]
    );
    assert_eq!(preview.bins.edges, vec![0.0, 25.0, 50.0, 75.0, 99.0]);
    assert_eq!(preview.bins.sequence, vec![0, 1, 2, 3]);
}

#[test]
fn test_preview_reports_values_outside_custom_edges() {
    let sample = vec![Some(-1.0), Some(5.0), Some(15.0), Some(99.0)];
    let params = BinParams::new(BinMode::CustomEdges {
        edges: vec![0.0, 10.0, 20.0],
    });
    let preview = HistogramPreview::build(&sample, &params).unwrap();

    assert_eq!(preview.outside, 2);
    assert_eq!(preview.bars.len(), 2);
}

#[test]
fn test_preview_render() {
    let sample = vec![
        Some(2.0),
        Some(4.0),
        Some(6.0),
        Some(12.0),
        Some(14.0),
        Some(25.0),
        None,
    ];
    let params = BinParams::new(BinMode::CustomEdges {
        edges: vec![0.0, 10.0, 20.0, 30.0],
    })
    .with_nulls(NullHandling::SeparateBucket);
    let preview = HistogramPreview::build(&sample, &params).unwrap();

    insta::assert_snapshot!(preview.render(6), @r"
    [0, 10)  | ###### 3
    [10, 20) | #### 2
    [20, 30) | ## 1
    (null)   | ## 1
    ");
}

#[test]
fn test_preview_of_empty_sample() {
    let params = BinParams::new(BinMode::EqualWidth {
        bins: 4,
        from: None,
        to: None,
    });
    let preview = HistogramPreview::build(&[None, None], &params).unwrap();

    assert!(preview.bars.is_empty());
    assert!(preview.null_bar.is_none());
    assert!(preview.bins.is_empty());
    assert_eq!(preview.render(10), "");
}

#[test]
fn test_invalid_params_rejected_before_sampling() {
    let params = BinParams::new(BinMode::Step { width: -1.0 });
    assert!(HistogramPreview::build(&[Some(1.0)], &params).is_err());
}

#[test]
fn test_preview_with_capped_outliers() {
    let sample: Vec<Option<f64>> = (1..=10).map(f64::from).chain([100.0]).map(Some).collect();
    let params = BinParams::new(BinMode::EqualWidth {
        bins: 5,
        from: None,
        to: None,
    })
    .with_cap_outliers();
    let preview = HistogramPreview::build(&sample, &params).unwrap();

    assert_eq!(preview.bins.edges.last(), Some(&16.0));
    assert_eq!(preview.bars.last().unwrap().count, 1);
    assert_eq!(preview.bars.last().unwrap().label, "[13, 16)");
    assert_eq!(preview.outside, 0);
}
