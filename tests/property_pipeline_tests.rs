use approx::relative_eq;
use lap_delta::data::align::align;
use lap_delta::data::calibrate::AxisCalibrator;
use lap_delta::data::filter::{retain_increasing, MonotonicPolicy};
use lap_delta::data::laptime::lap_time;
use lap_delta::data::model::{Axis, CalibrationSample, DomainSeries, ResampledSeries, SeriesIndex};
use lap_delta::data::resample::{resample, Resolution};
use proptest::prelude::*;

fn policy() -> impl Strategy<Value = MonotonicPolicy> {
    prop_oneof![
        Just(MonotonicPolicy::LastRetained),
        Just(MonotonicPolicy::PreviousRaw),
    ]
}

fn grid(series: SeriesIndex, start: f64, step: f64, n: usize) -> ResampledSeries {
    let position = (0..n).map(|i| start + step * i as f64).collect();
    let velocity = (0..n).map(|i| 100.0 + i as f64).collect();
    ResampledSeries::from_samples(series, position, velocity).expect("grid")
}

proptest! {
    #[test]
    fn collinear_guides_are_reproduced(
        slope in -50.0f64..50.0,
        intercept in -500.0f64..500.0,
        first_pixel in -100.0f64..1000.0,
        gaps in prop::collection::vec(0.5f64..200.0, 2..10)
    ) {
        let mut pixel = first_pixel;
        let mut calibrator = AxisCalibrator::new(Axis::X);
        calibrator.push(CalibrationSample::new(pixel, slope * pixel + intercept));
        for gap in gaps {
            pixel += gap;
            calibrator.push(CalibrationSample::new(pixel, slope * pixel + intercept));
        }

        let mapping = calibrator.fit().expect("fit");
        for sample in calibrator.samples() {
            let got = mapping.apply(sample.pixel);
            prop_assert!(
                (got - sample.value).abs() <= 1e-7 * (1.0 + sample.value.abs()),
                "pixel {} → {} expected {}", sample.pixel, got, sample.value
            );
        }
    }

    #[test]
    fn monotonic_filter_is_idempotent(
        points in prop::collection::vec((-1.0f64..2.0, 0.0f64..300.0), 0..200),
        policy in policy()
    ) {
        let (position, velocity) = retain_increasing(points, policy);
        prop_assert!(position.windows(2).all(|w| w[1] > w[0]));

        let again = retain_increasing(
            position.iter().copied().zip(velocity.iter().copied()),
            policy,
        );
        prop_assert_eq!(again, (position, velocity));
    }

    #[test]
    fn resampling_keeps_exact_endpoints(
        start in -0.5f64..0.5,
        steps in prop::collection::vec((1e-4f64..0.05, 20.0f64..300.0), 1..60),
        first_speed in 20.0f64..300.0,
        count in 2usize..2000
    ) {
        let mut position = vec![start];
        let mut velocity = vec![first_speed];
        for (dx, v) in steps {
            let next = position[position.len() - 1] + dx;
            position.push(next);
            velocity.push(v);
        }
        let domain = DomainSeries::new(SeriesIndex::First, position.clone(), velocity.clone())
            .expect("increasing");

        let resampled = resample(&domain, Resolution::Count(count)).expect("resample");
        prop_assert_eq!(resampled.len(), count);
        prop_assert_eq!(resampled.position()[0], position[0]);
        prop_assert_eq!(resampled.position()[count - 1], position[position.len() - 1]);
        prop_assert_eq!(resampled.velocity()[0], velocity[0]);
        prop_assert_eq!(resampled.velocity()[count - 1], velocity[velocity.len() - 1]);
    }

    #[test]
    fn alignment_is_symmetric(
        left_start in 0.0f64..0.01,
        right_start in 0.0f64..0.01,
        left_len in 200usize..400,
        right_len in 200usize..400,
        epsilon in prop_oneof![Just(0.0), Just(1e-4), Just(1e-3)]
    ) {
        let left = grid(SeriesIndex::First, left_start, 1e-4, left_len);
        let right = grid(SeriesIndex::Second, right_start, 1e-4, right_len);

        let forward = align(&left, &right, epsilon).expect("forward");
        let backward = align(&right, &left, epsilon).expect("backward");
        prop_assert_eq!(&forward.left, &backward.right);
        prop_assert_eq!(&forward.right, &backward.left);

        if (left_start - right_start).abs() < epsilon {
            prop_assert_eq!(&forward.left, &left);
            prop_assert_eq!(&forward.right, &right);
        } else {
            let (a, b) = (forward.left.start(), forward.right.start());
            // The later start is untouched; the other lap now starts at or after it.
            prop_assert!(a.min(b) >= left_start.max(right_start));
        }
    }

    #[test]
    fn constant_speed_gives_linear_lap_time(
        speed in 10.0f64..350.0,
        length in 0.5f64..25.0,
        step in 1e-5f64..1e-2,
        n in 2usize..500
    ) {
        let position = (0..n).map(|i| step * i as f64).collect();
        let velocity = vec![speed; n];
        let series = ResampledSeries::from_samples(SeriesIndex::Second, position, velocity)
            .expect("series");

        let times = lap_time(&series, length).expect("lap time");
        let slope = step * length * 1000.0 / (speed / 3.6);
        for (i, &t) in times.time.iter().enumerate() {
            let expected = slope * i as f64;
            prop_assert!(
                relative_eq!(t, expected, epsilon = 1e-9, max_relative = 1e-9),
                "sample {}: {} vs {}", i, t, expected
            );
        }
    }
}
