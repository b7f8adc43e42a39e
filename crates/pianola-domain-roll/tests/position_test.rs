use pianola_domain_roll::{
    note_name, parse_metadata_text, parse_pixels, PositionMapper, RollMetadata,
};

#[test]
fn pixel_round_trip_is_lossless() {
    let mapper = PositionMapper::new(20_000, 1_250.0, 1.0);
    for tick in [0, 1, 17, 999, 19_999, 20_000] {
        assert_eq!(mapper.pixel_to_tick(mapper.tick_to_pixel(tick)), tick);
    }
    assert_eq!(mapper.tick_to_pixel(300), 1_550.0);
}

#[test]
fn scaled_pixel_round_trip_is_lossless() {
    let mapper = PositionMapper::new(20_000, 80.0, 0.3);
    for tick in (0..20_000).step_by(333) {
        assert_eq!(mapper.pixel_to_tick(mapper.tick_to_pixel(tick)), tick);
    }
}

#[test]
fn progress_round_trip_within_one_tick() {
    let mapper = PositionMapper::new(7_919, 0.0, 1.0);
    let tolerance = 1.0 / 7_919.0;
    for step in 0..=100 {
        let progress = step as f64 / 100.0;
        let back = mapper.tick_to_progress(mapper.progress_to_tick(progress));
        assert!((back - progress).abs() <= tolerance, "{progress} -> {back}");
    }
}

#[test]
fn conversions_clamp_instead_of_failing() {
    let mapper = PositionMapper::new(1_000, 100.0, 1.0);

    assert_eq!(mapper.progress_to_tick(-0.5), 0);
    assert_eq!(mapper.progress_to_tick(1.5), 1_000);
    assert_eq!(mapper.progress_to_tick(f64::NAN), 0);
    assert_eq!(mapper.pixel_to_tick(10.0), 0);
    assert_eq!(mapper.tick_to_progress(-20), 0.0);
    assert_eq!(mapper.tick_to_progress(5_000), 1.0);
    assert_eq!(mapper.clamp_tick(-3), 0);
    assert_eq!(mapper.clamp_tick(1_001), 1_000);
}

#[test]
fn zero_total_ticks_reports_zero_progress() {
    let mapper = PositionMapper::new(0, 0.0, 1.0);
    assert_eq!(mapper.tick_to_progress(10), 0.0);
    assert_eq!(mapper.clamp_tick(10), 10);
}

#[test]
fn invalid_scale_falls_back_to_identity() {
    let mapper = PositionMapper::new(100, 0.0, 0.0);
    assert_eq!(mapper.pixels_per_tick(), 1.0);
}

#[test]
fn metadata_text_parsing() {
    assert_eq!(
        parse_metadata_text("@LAST_HOLE:\t\t\t40210px"),
        Some(("LAST_HOLE".to_string(), "40210px".to_string()))
    );
    assert_eq!(parse_metadata_text("@EMPTY:"), None);
    assert_eq!(parse_metadata_text("no marker"), None);
    assert_eq!(parse_pixels("12.7px"), Some(12));
    assert_eq!(parse_pixels("wide"), None);

    let mut metadata = RollMetadata::new();
    for text in [
        "@LAST_HOLE:\t\t\t40210px",
        "@AVG_HOLE_WIDTH:\t15.6px",
        "@IMAGE_WIDTH:\t\t3916px",
        "@IMAGE_LENGTH:\t\t41487px",
    ] {
        let (key, value) = parse_metadata_text(text).expect("metadata line");
        metadata.insert(key, value);
    }
    assert_eq!(metadata.last_hole_px(), Some(40_210));
    assert_eq!(metadata.avg_hole_width_px(), Some(15));
    assert_eq!(metadata.image_width_px(), Some(3_916));
    assert_eq!(metadata.image_length_px(), Some(41_487));
    assert_eq!(metadata.first_hole_px(), None);
}

#[test]
fn note_names_use_scientific_pitch() {
    assert_eq!(note_name(21), "A0");
    assert_eq!(note_name(60), "C4");
    assert_eq!(note_name(61), "C#4");
    assert_eq!(note_name(108), "C8");
}
