//! Randomised filter properties.

#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]

use proptest::prelude::*;
use volume_filter::{
    gradient, median, promote, smooth, transform, FourierDirection, FourierParams,
    GradientParams, MedianParams, SmoothParams,
};
use volume_grid::{Volume, VolumeGeometry, VolumeTransform};

fn volume_from_coefficients(sizes: [usize; 3], coefficients: [f64; 3]) -> Volume<f64> {
    let geometry = VolumeGeometry::new(
        sizes.to_vec(),
        vec![1.0, 1.0, 1.0],
        VolumeTransform::identity(),
    )
    .unwrap();
    Volume::from_fn(geometry, |index| {
        coefficients[0] * index[0] as f64
            + coefficients[1] * (index[1] * index[1]) as f64
            + coefficients[2] * ((index[2] + index[0]) as f64).sin()
    })
}

fn side() -> impl Strategy<Value = usize> {
    1usize..6
}

fn coefficient() -> impl Strategy<Value = f64> {
    -20.0f64..20.0
}

fn odd_extent() -> impl Strategy<Value = usize> {
    (0usize..3).prop_map(|half| 2 * half + 1)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_smooth_preserves_constant(
        sx in side(), sy in side(), sz in side(),
        value in -100.0f64..100.0,
        stdev in 0.1f64..2.5,
    ) {
        let geometry = VolumeGeometry::new(
            vec![sx, sy, sz],
            vec![1.0, 1.0, 1.0],
            VolumeTransform::identity(),
        )
        .unwrap();
        let input = Volume::filled(geometry, value);
        let output = smooth(&input, &SmoothParams::new().with_stdev(vec![stdev])).unwrap();
        for &sample in output.as_slice() {
            prop_assert!((sample - value).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_fft_roundtrip_recovers_input(
        sx in side(), sy in side(), sz in side(),
        a in coefficient(), b in coefficient(), c in coefficient(),
    ) {
        let input = promote(&volume_from_coefficients([sx, sy, sz], [a, b, c]));
        let spectrum = transform(&input, &FourierParams::new()).unwrap();
        let recovered = transform(
            &spectrum,
            &FourierParams::new().with_direction(FourierDirection::Inverse),
        )
        .unwrap();
        for index in input.geometry().indices() {
            let expected = input.get(&index);
            let actual = recovered.get(&index);
            prop_assert!((actual.re - expected.re).abs() < 1e-8);
            prop_assert!((actual.im - expected.im).abs() < 1e-8);
        }
    }

    #[test]
    fn prop_fft_is_linear_in_scale(
        sx in side(), sy in side(),
        a in coefficient(), b in coefficient(), c in coefficient(),
        scale in -4.0f64..4.0,
    ) {
        let base = volume_from_coefficients([sx, sy, 1], [a, b, c]);
        let scaled = base.map(|sample| sample * scale);
        let spectrum_base = transform(&promote(&base), &FourierParams::new()).unwrap();
        let spectrum_scaled = transform(&promote(&scaled), &FourierParams::new()).unwrap();
        for index in base.geometry().indices() {
            let expected = spectrum_base.get(&index) * scale;
            let actual = spectrum_scaled.get(&index);
            prop_assert!((actual.re - expected.re).abs() < 1e-7);
            prop_assert!((actual.im - expected.im).abs() < 1e-7);
        }
    }

    #[test]
    fn prop_median_outputs_existing_values(
        sx in side(), sy in side(), sz in side(),
        a in coefficient(), b in coefficient(), c in coefficient(),
        extent in odd_extent(),
    ) {
        let input = volume_from_coefficients([sx, sy, sz], [a, b, c]);
        let output = median(&input, &MedianParams::new().with_extent(vec![extent])).unwrap();
        for &sample in output.as_slice() {
            prop_assert!(input.as_slice().contains(&sample));
        }
    }

    #[test]
    fn prop_median_preserves_constant(
        sx in side(), sy in side(), sz in side(),
        level in -100.0f64..100.0,
        extent in odd_extent(),
    ) {
        let input = volume_from_coefficients([sx, sy, sz], [0.0, 0.0, 0.0])
            .map(|sample| sample + level);
        let output = median(&input, &MedianParams::new().with_extent(vec![extent])).unwrap();
        for &sample in output.as_slice() {
            prop_assert_eq!(sample, level);
        }
    }

    #[test]
    fn prop_scalar_parameters_broadcast(
        sx in side(), sy in side(), sz in side(),
        a in coefficient(), b in coefficient(), c in coefficient(),
        stdev in 0.0f64..2.0,
    ) {
        let input = volume_from_coefficients([sx, sy, sz], [a, b, c]);
        let scalar = smooth(&input, &SmoothParams::new().with_stdev(vec![stdev])).unwrap();
        let triple =
            smooth(&input, &SmoothParams::new().with_stdev(vec![stdev, stdev, stdev])).unwrap();
        prop_assert_eq!(scalar, triple);
    }

    #[test]
    fn prop_gradient_magnitude_non_negative(
        sx in side(), sy in side(), sz in side(),
        a in coefficient(), b in coefficient(), c in coefficient(),
    ) {
        let input = volume_from_coefficients([sx, sy, sz], [a, b, c]);
        let params = GradientParams::new().with_magnitude(true);
        let output = gradient(&input, &params).unwrap();
        for &sample in output.as_slice() {
            prop_assert!(sample >= 0.0);
        }
    }
}
