use chrono::{TimeZone, Utc};
use pattern_projector::interval::Interval;
use pattern_projector::model::PriceSeries;
use pattern_projector::pattern::{
    build_projections, compound_path, encode, locate, ProjectionParams,
};
use pattern_projector::ProjectionError;

/// Chronological closes that move +1 % on 'U' and -1 % on 'D'.
fn series_from_moves(moves: &str) -> PriceSeries {
    let mut closes = vec![100.0];
    for m in moves.chars() {
        let last = *closes.last().unwrap();
        closes.push(if m == 'U' { last * 1.01 } else { last * 0.99 });
    }
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    PriceSeries::from_closes("TEST", Interval::daily(), start, &closes)
}

/// Most recent move first: three copies of "UDUDUDUD" separated by "DD".
fn recent_first_moves() -> String {
    format!(
        "{}{}{}{}{}{}",
        "UDUDUDUD",
        "DD",
        "UDUDUDUD",
        "DD",
        "UDUDUDUD",
        "D".repeat(11)
    )
}

fn scenario_series() -> PriceSeries {
    let chronological: String = recent_first_moves().chars().rev().collect();
    series_from_moves(&chronological)
}

#[test]
fn encode_matches_generated_moves() {
    let s = scenario_series();
    assert_eq!(s.len(), 40);
    let moves = encode(&s).unwrap();
    assert_eq!(moves.len(), 39);
    assert_eq!(moves.reversed().to_string(), recent_first_moves());
}

#[test]
fn locate_registers_earlier_repeat_with_full_length() {
    let found = locate(&scenario_series(), 6, 8).unwrap();
    let ordered: Vec<(usize, usize)> = found.into_iter().collect();
    assert_eq!(ordered, vec![(10, 8), (20, 8), (2, 6), (12, 6), (22, 6)]);
}

#[test]
fn projections_skip_matches_too_close_to_now() {
    let s = scenario_series();
    let lines = build_projections(&s, &ProjectionParams::default()).unwrap();
    // offset 2 cannot supply 10 following moves
    assert_eq!(lines.len(), 4);
    let lengths: Vec<usize> = lines.iter().map(|l| l.pattern_length).collect();
    assert_eq!(lengths, vec![8, 8, 6, 6]);
}

#[test]
fn projection_replays_moves_after_match() {
    let s = scenario_series();
    let anchor = s.last().unwrap().close;
    let lines = build_projections(&s, &ProjectionParams::default()).unwrap();
    let first = &lines[0];

    assert_eq!(first.label, "30-Jan-2024");
    assert_eq!(first.points.len(), 11);
    assert_eq!(first.points[0].date, "09-Feb-2024");
    assert_eq!(first.points[1].date, "10-Feb-2024");
    assert_eq!(first.points[10].date, "19-Feb-2024");
    assert_eq!(first.points[0].close, anchor);

    let expected_last = anchor * 0.99f64.powi(5) * 1.01f64.powi(5);
    assert!((first.points[10].close - expected_last).abs() < 1e-9);
    // the first replayed move is the "D" just after the match
    assert!(first.points[1].close < anchor);
    assert!(first.average_change.abs() < 1e-9);
}

#[test]
fn num_lines_caps_output() {
    let s = scenario_series();
    let params = ProjectionParams {
        num_lines: 2,
        ..ProjectionParams::default()
    };
    let lines = build_projections(&s, &params).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].label, "30-Jan-2024");
    assert_eq!(lines[1].label, "20-Jan-2024");
}

#[test]
fn projections_are_deterministic() {
    let s = scenario_series();
    let params = ProjectionParams::default();
    assert_eq!(
        build_projections(&s, &params).unwrap(),
        build_projections(&s, &params).unwrap()
    );
}

#[test]
fn no_repeat_yields_empty_result() {
    // the latest pattern repeats at most twice, which is not enough
    let s = series_from_moves("UUUUUUUUUUDDUDDUDDU");
    let found = locate(&s, 6, 8).unwrap();
    assert!(found.is_empty());
    assert!(build_projections(&s, &ProjectionParams::default())
        .unwrap()
        .is_empty());
}

#[test]
fn single_point_series_is_insufficient() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let s = PriceSeries::from_closes("ONE", Interval::daily(), start, &[10.0]);
    assert_eq!(
        encode(&s),
        Err(ProjectionError::InsufficientData { needed: 2, got: 1 })
    );
    assert!(matches!(
        build_projections(&s, &ProjectionParams::default()),
        Err(ProjectionError::InsufficientData { .. })
    ));
}

#[test]
fn intraday_series_formats_dates_with_time() {
    let chronological: String = recent_first_moves().chars().rev().collect();
    let mut closes = vec![100.0];
    for m in chronological.chars() {
        let last = *closes.last().unwrap();
        closes.push(if m == 'U' { last * 1.01 } else { last * 0.99 });
    }
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let s = PriceSeries::from_closes("TEST", Interval::parse("1h").unwrap(), start, &closes);
    let params = ProjectionParams {
        date_step: chrono::Duration::hours(1),
        ..ProjectionParams::default()
    };
    let lines = build_projections(&s, &params).unwrap();
    // anchor is 39 hours after 01-Jan 09:00
    assert_eq!(lines[0].points[0].date, "03-Jan-2024 00:00");
    assert_eq!(lines[0].points[1].date, "03-Jan-2024 01:00");
}

#[test]
fn compound_path_known_scenario() {
    let path = compound_path(100.0, &[2.0, -1.0, 3.0]);
    for (got, want) in path.iter().zip([100.0, 102.0, 100.98, 103.0094]) {
        assert!((got - want).abs() < 1e-6);
    }
}
