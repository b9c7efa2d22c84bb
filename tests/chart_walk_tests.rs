use approx::assert_relative_eq;
use lap_delta::data::calibrate::AxisCalibrator;
use lap_delta::data::filter::MonotonicPolicy;
use lap_delta::data::loader::{combine, load_markup};
use lap_delta::data::model::{Axis, SeriesIndex};
use lap_delta::data::resample::to_domain;
use lap_delta::data::walker::walk;
use lap_delta::{analyze, AnalysisConfig, CancelToken, LapError};

fn x_axis() -> &'static str {
    r#"<g class="axis x">
        <path d="M0 0 v50" class="line"/>
        <g class="guides"><path d="M0 0 v50" class="major line"/><text x="0" y="60">0.0</text></g>
        <g class="guides"><path d="M100 0 v50" class="major line"/><text x="100" y="60">1.0</text></g>
    </g>"#
}

fn y_axis() -> &'static str {
    r#"<g class="axis y">
        <g class="guides"><path d="M0 0 h100" class="guide line"/><text>0.0</text></g>
        <g class="guides"><path d="M0 50 h100" class="guide line"/><text>200.0</text></g>
    </g>"#
}

fn document(axes: &str, series: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
        <html><head><title>Lap details</title>
        <script>if (a < b && c > d) {{ draw("<g class='plot'>"); }}</script>
        </head><body>
        <!-- <g class="plot"> in a comment is not the chart -->
        <svg xmlns="http://www.w3.org/2000/svg">
          <g class="graph line-graph">
            <g class="plot" transform="translate(40, 20)">
              <rect class="background" width="100" height="50"/>
              {axes}
              {series}
            </g>
            <g class="titles"><text class="title">Speed</text></g>
          </g>
        </svg>
        </body></html>"#
    )
}

#[test]
fn reference_chart_is_recovered_end_to_end() {
    let markup = document(
        &format!("{}{}", x_axis(), y_axis()),
        r#"<g class="series serie-0 color-0"><path d="M0 50 L100 0" class="line"/></g>"#,
    );
    let capture = walk(&markup).expect("walk");

    assert_eq!(capture.series(SeriesIndex::First).points, vec![[0.0, 50.0], [100.0, 0.0]]);
    assert!(capture.series(SeriesIndex::Second).is_empty());

    let x = AxisCalibrator::from_samples(Axis::X, capture.samples(Axis::X))
        .fit()
        .expect("x fit");
    let y = AxisCalibrator::from_samples(Axis::Y, capture.samples(Axis::Y))
        .fit()
        .expect("y fit");
    assert_relative_eq!(x.apply(0.0), 0.0, epsilon = 1e-12);
    assert_relative_eq!(x.apply(100.0), 1.0, epsilon = 1e-12);
    assert_relative_eq!(y.apply(0.0), 0.0, epsilon = 1e-12);
    assert_relative_eq!(y.apply(50.0), 200.0, epsilon = 1e-12);

    let domain = to_domain(
        capture.series(SeriesIndex::First),
        &x,
        &y,
        MonotonicPolicy::LastRetained,
    )
    .expect("domain");
    assert_eq!(domain.len(), 2);
    assert_relative_eq!(domain.position()[0], 0.0, epsilon = 1e-12);
    assert_relative_eq!(domain.velocity()[0], 200.0, epsilon = 1e-12);
    assert_relative_eq!(domain.position()[1], 1.0, epsilon = 1e-12);
    assert_relative_eq!(domain.velocity()[1], 0.0, epsilon = 1e-12);
}

#[test]
fn missing_y_axis_is_an_insufficient_calibration_error() {
    let markup = document(
        x_axis(),
        r#"<g class="series serie-0 color-0"><path d="M0 40 L100 10"/></g>
           <g class="series serie-1 color-1"><path d="M0 30 L100 20"/></g>"#,
    );
    let capture = walk(&markup).expect("walking still succeeds");
    assert!(capture.axis_y.is_empty());

    let err = analyze(&capture, &AnalysisConfig::with_length(3.0), &CancelToken::new())
        .expect_err("no y calibration");
    assert_eq!(
        err,
        LapError::InsufficientCalibration {
            axis: Axis::Y,
            distinct: 0
        }
    );
}

#[test]
fn unparseable_guide_label_is_malformed_markup() {
    let axes = x_axis().replace("1.0</text>", "one</text>");
    let markup = document(&axes, "");
    match walk(&markup) {
        Err(LapError::MalformedMarkup { role, token, .. }) => {
            assert!(role.contains("axis x"), "role {role}");
            assert_eq!(token, "one");
        }
        other => panic!("expected malformed markup, got {other:?}"),
    }
}

#[test]
fn both_laps_compared_from_one_page() {
    let markup = document(
        &format!("{}{}", x_axis(), y_axis()),
        // serie-0 at 100 km/h, serie-1 at 150 km/h, with a pen retrace in serie-0.
        r#"<g class="series serie-0 color-0"><path d="M0 25 L40 25 L30 25 L60 25 L100 25"/></g>
           <g class="series serie-1 color-1"><path d="M0 37.5 L100 37.5"/></g>"#,
    );
    let capture = walk(&markup).expect("walk");
    let config = AnalysisConfig {
        circuit_length_km: 1.5,
        ..AnalysisConfig::default()
    };
    let cmp = analyze(&capture, &config, &CancelToken::new()).expect("analysis");

    // 1.5 km: 54 s at 100 km/h, 36 s at 150 km/h.
    assert_relative_eq!(cmp.lap_time[0].total(), 54.0, max_relative = 1e-9);
    assert_relative_eq!(cmp.lap_time[1].total(), 36.0, max_relative = 1e-9);
    assert_relative_eq!(cmp.final_gap().expect("gap"), 18.0, max_relative = 1e-9);

    let last = cmp.time_diff.last().expect("diff");
    assert_relative_eq!(last[0], 1.5, epsilon = 1e-12);
}

#[test]
fn comparison_page_supplies_the_second_lap() {
    let primary = load_markup(&document(
        &format!("{}{}", x_axis(), y_axis()),
        r#"<g class="series serie-0 color-0"><path d="M0 25 L100 25"/></g>
           <g class="series serie-1 color-1"><path d="M0 25 L100 25"/></g>"#,
    ))
    .expect("primary");

    // A single-lap page drawn with markers: only serie-0 is present.
    let other = load_markup(&document(
        &format!("{}{}", x_axis(), y_axis()),
        r#"<g class="series serie-0 color-0"><g class="dots">
             <circle cx="0" cy="12.5"/><desc class="value">0:12.5</desc>
             <circle cx="50" cy="12.5"/><desc class="value">50:12.5</desc>
             <circle cx="100" cy="12.5"/><desc class="value">100:12.5</desc>
           </g></g>"#,
    ))
    .expect("comparison");

    let capture = combine(primary, Some(&other)).expect("combine");
    assert_eq!(
        capture.series(SeriesIndex::Second).points,
        vec![[0.0, 12.5], [50.0, 12.5], [100.0, 12.5]]
    );

    let cmp = analyze(&capture, &AnalysisConfig::with_length(1.0), &CancelToken::new())
        .expect("analysis");
    // 100 km/h against 50 km/h over 1 km.
    assert_relative_eq!(cmp.final_gap().expect("gap"), 36.0 - 72.0, max_relative = 1e-9);
}

#[test]
fn comparison_page_without_series_is_rejected() {
    let primary = walk(&document(
        &format!("{}{}", x_axis(), y_axis()),
        r#"<g class="series serie-0 color-0"><path d="M0 25 L100 25"/></g>"#,
    ))
    .expect("primary");
    let empty = walk(&document(x_axis(), "")).expect("empty");

    let err = primary.with_substitute(&empty).expect_err("nothing to take");
    assert_eq!(
        err,
        LapError::MissingSeries {
            series: SeriesIndex::Second
        }
    );
}
