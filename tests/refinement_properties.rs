//! End-to-end property tests for the refinement pipeline
//!
//! Exercises the documented invariants of each strategy through the public
//! API: output ranges, trimap partitioning, edge-band behavior, and
//! compositing guarantees.

use image::{Rgba, RgbaImage};
use mattecore::{
    refine_and_composite, MatteError, ProbabilityMap, RefinementConfig, RefinementPipeline,
    RefinementStrategy, Result,
};

fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn solid_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 77, 255])
    })
}

/// Left half background (0.0), right half foreground (1.0)
fn step_map(width: u32, height: u32) -> ProbabilityMap {
    let data = (0..width * height)
        .map(|i| if i % width < width / 2 { 0.0 } else { 1.0 })
        .collect();
    ProbabilityMap::from_f32(data, width, height).unwrap()
}

#[test]
fn alpha_stays_in_range_for_every_strategy() -> Result<()> {
    init_test_logging();
    let strategies = [
        RefinementStrategy::FastAlpha,
        RefinementStrategy::RefinedAlpha,
        RefinementStrategy::ChromaKeyFallback,
    ];

    for strategy in strategies {
        let mut image = solid_image(24, 24);
        let map = step_map(24, 24);
        let config = RefinementConfig::builder().strategy(strategy).build()?;
        let probability = strategy.requires_probability().then_some(&map);

        let outcome = refine_and_composite(&mut image, probability, &config)?;

        for &alpha in outcome.matte.values() {
            assert!(alpha.is_finite(), "{strategy}: non-finite alpha");
            assert!(
                (0.0..=1.0).contains(&alpha),
                "{strategy}: alpha {alpha} out of range"
            );
        }
    }
    Ok(())
}

#[test]
fn alpha_stays_in_range_at_zero_sigma() -> Result<()> {
    // Degenerate sigmas push every bilateral weight to zero; the guard
    // must fall back to unsmoothed values rather than emitting NaN
    let mut image = solid_image(16, 16);
    let map = step_map(16, 16);
    let config = RefinementConfig::builder()
        .strategy(RefinementStrategy::RefinedAlpha)
        .sigma_space(0.0)
        .sigma_range(0.0)
        .build()?;

    let outcome = refine_and_composite(&mut image, Some(&map), &config)?;
    for &alpha in outcome.matte.values() {
        assert!(alpha.is_finite());
        assert!((0.0..=1.0).contains(&alpha));
    }
    Ok(())
}

#[test]
fn trimap_counts_partition_the_pixel_set() -> Result<()> {
    let mut image = solid_image(32, 32);
    let map = step_map(32, 32);
    let config = RefinementConfig::builder()
        .strategy(RefinementStrategy::RefinedAlpha)
        .build()?;

    let outcome = refine_and_composite(&mut image, Some(&map), &config)?;
    let counts = outcome.trimap_counts.expect("refined strategy builds a trimap");
    assert_eq!(counts.total(), 32 * 32);
    Ok(())
}

#[test]
fn hard_step_produces_soft_transition_band() -> Result<()> {
    // A step through the probability map (0 on one half, 1 on the other,
    // with the step's boundary sample between them as any discretized
    // oracle edge carries) must come out as a band of intermediate alphas
    // centered on the step, saturated on both sides
    let width = 33u32;
    let height = 32u32;
    let data: Vec<f32> = (0..width * height)
        .map(|i| {
            let x = i % width;
            if x < width / 2 {
                0.0
            } else if x == width / 2 {
                0.5
            } else {
                1.0
            }
        })
        .collect();
    let map = ProbabilityMap::from_f32(data, width, height)?;

    let mut image = solid_image(width, height);
    let config = RefinementConfig::builder()
        .strategy(RefinementStrategy::RefinedAlpha)
        .build()?;

    let outcome = refine_and_composite(&mut image, Some(&map), &config)?;
    let matte = &outcome.matte;

    let mid_row = height / 2;
    let band: Vec<f32> = (0..width).map(|x| matte.get(x, mid_row)).collect();

    // Far from the step the matte saturates
    assert_eq!(band[0], 0.0);
    assert_eq!(band[(width - 1) as usize], 1.0);

    // The transition band exists, has nonzero width, and sits on the step
    let partial: Vec<u32> = (0..width)
        .filter(|&x| {
            let a = band[x as usize];
            a > 0.0 && a < 1.0
        })
        .collect();
    assert!(
        !partial.is_empty(),
        "no soft transition produced across the step"
    );
    for &x in &partial {
        assert!(x.abs_diff(width / 2) <= 3, "band pixel {x} far from step");
    }

    // Alpha never decreases moving from background toward foreground
    for pair in band.windows(2) {
        assert!(pair[1] >= pair[0] - 1e-6);
    }
    Ok(())
}

#[test]
fn composite_only_touches_the_alpha_channel() -> Result<()> {
    let mut image = solid_image(20, 20);
    let original = image.clone();
    let map = step_map(20, 20);
    let config = RefinementConfig::default();

    refine_and_composite(&mut image, Some(&map), &config)?;

    for (before, after) in original.pixels().zip(image.pixels()) {
        assert_eq!(before[0], after[0]);
        assert_eq!(before[1], after[1]);
        assert_eq!(before[2], after[2]);
    }
    Ok(())
}

#[test]
fn chroma_fallback_matches_documented_scenario() -> Result<()> {
    // 4x4 black image with a white 2x2 center block: corners transparent,
    // center opaque, even after the edge box blur pass (no partial-alpha
    // pixels exist for it to touch)
    let mut image = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
    for y in 1..3 {
        for x in 1..3 {
            image.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }

    let config = RefinementConfig::builder()
        .strategy(RefinementStrategy::ChromaKeyFallback)
        .build()?;
    refine_and_composite(&mut image, None, &config)?;

    assert_eq!(image.get_pixel(0, 0)[3], 0);
    assert_eq!(image.get_pixel(3, 3)[3], 0);
    assert_eq!(image.get_pixel(1, 1)[3], 255);
    assert_eq!(image.get_pixel(2, 2)[3], 255);
    Ok(())
}

#[test]
fn probability_scale_conventions_agree() -> Result<()> {
    // The same mask delivered as [0,1] floats, 0-255 floats, and bytes
    // must refine identically
    let values_unit: Vec<f32> = (0..64).map(|i| f32::from(u8::try_from(i * 4).unwrap()) / 255.0).collect();
    let values_byte: Vec<f32> = values_unit.iter().map(|v| v * 255.0).collect();
    let bytes: Vec<u8> = values_byte.iter().map(|&v| v as u8).collect();

    let from_unit = ProbabilityMap::from_f32(values_unit, 8, 8)?;
    let from_scaled = ProbabilityMap::from_f32(values_byte, 8, 8)?;
    let from_bytes = ProbabilityMap::from_bytes(&bytes, 8, 8)?;

    let image = solid_image(8, 8);
    let config = RefinementConfig::default();
    let pipeline = RefinementPipeline::new(config)?;

    let a = pipeline.compute_matte(&image, Some(&from_unit))?;
    let b = pipeline.compute_matte(&image, Some(&from_scaled))?;
    let c = pipeline.compute_matte(&image, Some(&from_bytes))?;

    for ((&x, &y), &z) in a.values().iter().zip(b.values()).zip(c.values()) {
        assert!((x - y).abs() < 1e-6);
        assert!((x - z).abs() < 1e-6);
    }
    Ok(())
}

#[test]
fn failures_never_partially_write_the_image() {
    let mut image = solid_image(10, 10);
    let original = image.clone();

    // Mismatched probability dimensions
    let wrong_size = step_map(5, 5);
    let config = RefinementConfig::default();
    let err = refine_and_composite(&mut image, Some(&wrong_size), &config).unwrap_err();
    assert!(matches!(err, MatteError::DimensionMismatch { .. }));
    assert_eq!(image.as_raw(), original.as_raw());

    // Blank oracle output
    let blank = ProbabilityMap::from_f32(vec![0.0; 100], 10, 10).unwrap();
    let err = refine_and_composite(&mut image, Some(&blank), &config).unwrap_err();
    assert!(matches!(err, MatteError::NoSubjectDetected));
    assert_eq!(image.as_raw(), original.as_raw());

    // Missing probability for an oracle strategy
    let err = refine_and_composite(&mut image, None, &config).unwrap_err();
    assert!(matches!(err, MatteError::InvalidConfig(_)));
    assert_eq!(image.as_raw(), original.as_raw());
}
