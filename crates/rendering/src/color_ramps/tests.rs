use std::collections::BTreeMap;

use bevy::color::Srgba;

use super::*;

fn assert_color_near(actual: Srgba, expected: Srgba) {
    let diff = (actual.red - expected.red).abs()
        + (actual.green - expected.green).abs()
        + (actual.blue - expected.blue).abs()
        + (actual.alpha - expected.alpha).abs();
    assert!(diff < 1e-5, "got: {actual:?}, expected: {expected:?}");
}

// ---------------------------------------------------------------------------
// color_at
// ---------------------------------------------------------------------------

#[test]
fn test_endpoints_are_exact() {
    let registry = RampRegistry::default();
    for name in registry.names() {
        let ramp = registry.resolve(name);
        let points = ramp.control_points();
        assert_eq!(Some(&ramp.color_at(0.0)), points.get(&0), "{name} at 0");
        assert_eq!(Some(&ramp.color_at(1.0)), points.get(&100), "{name} at 1");
    }
}

#[test]
fn test_out_of_range_fraction_is_clamped() {
    let ramp = ColorRamp::evenly_spaced("g", false, &[GREEN, RED]).expect("valid");
    assert_eq!(ramp.color_at(-3.0), GREEN);
    assert_eq!(ramp.color_at(7.5), RED);
    assert_eq!(ramp.color_at(f32::NAN), GREEN);
}

#[test]
fn test_midpoint_interpolates_every_channel() {
    let points = BTreeMap::from([
        (0, Srgba::new(0.0, 0.2, 1.0, 0.0)),
        (100, Srgba::new(1.0, 0.6, 0.0, 1.0)),
    ]);
    let ramp = ColorRamp::from_control_points("alpha", true, points).expect("valid");
    assert_color_near(ramp.color_at(0.5), Srgba::new(0.5, 0.4, 0.5, 0.5));
}

#[test]
fn test_interpolates_between_nearest_keys() {
    let points = BTreeMap::from([
        (0, Srgba::rgb(0.0, 0.0, 0.0)),
        (20, Srgba::rgb(1.0, 0.0, 0.0)),
        (60, Srgba::rgb(1.0, 1.0, 0.0)),
        (100, Srgba::rgb(1.0, 1.0, 1.0)),
    ]);
    let ramp = ColorRamp::from_control_points("steps", true, points).expect("valid");
    // 30% is a quarter of the way from 20 to 60
    assert_color_near(ramp.color_at(0.3), Srgba::rgb(1.0, 0.25, 0.0));
    // Fractional percent between integer keys
    assert_color_near(ramp.color_at(0.105), Srgba::rgb(0.525, 0.0, 0.0));
    assert_color_near(ramp.color_at(0.6), Srgba::rgb(1.0, 1.0, 0.0));
}

#[test]
fn test_evenly_spaced_keys() {
    let colors: Vec<Srgba> = (0..4)
        .map(|i| {
            let v = i as f32 / 3.0;
            Srgba::rgb(v, v, v)
        })
        .collect();
    let ramp = ColorRamp::evenly_spaced("four", false, &colors).expect("valid");
    let keys: Vec<u8> = ramp.control_points().keys().copied().collect();
    assert_eq!(keys, vec![0, 33, 67, 100]);
}

#[test]
fn test_evenly_spaced_colors_exact_at_every_key() {
    for n in 2..=8usize {
        let colors: Vec<Srgba> = (0..n)
            .map(|i| Srgba::new(0.1 * i as f32, 0.3, 0.61, 1.0 - 0.05 * i as f32))
            .collect();
        let ramp = ColorRamp::evenly_spaced(format!("n{n}"), false, &colors).expect("valid");
        assert_eq!(ramp.control_points().len(), n);

        for ((&key, stored), expected) in ramp.control_points().iter().zip(&colors) {
            assert_eq!(stored, expected, "n={n} key {key}");
            assert_eq!(
                ramp.color_at(f32::from(key) / 100.0),
                *expected,
                "n={n} sampled at key {key}"
            );
        }
    }
}

#[test]
fn test_eight_stop_builtin_keys() {
    let registry = RampRegistry::default();
    let keys: Vec<u8> = registry
        .resolve("viridis")
        .control_points()
        .keys()
        .copied()
        .collect();
    assert_eq!(keys, vec![0, 14, 29, 43, 57, 71, 86, 100]);
}

#[test]
fn test_preview_strip_spans_ramp() {
    let ramp = ColorRamp::evenly_spaced("g", false, &[GREEN, RED]).expect("valid");
    let strip = ramp.preview_strip(5);
    assert_eq!(strip.len(), 5);
    assert_eq!(strip[0], GREEN);
    assert_eq!(strip[4], RED);
    assert_color_near(strip[2], Srgba::rgb(0.5, 0.5, 0.0));
    assert!(ramp.preview_strip(0).is_empty());
}

// ---------------------------------------------------------------------------
// construction errors
// ---------------------------------------------------------------------------

#[test]
fn test_too_few_colors() {
    assert_eq!(
        ColorRamp::evenly_spaced("one", true, &[RED]),
        Err(RampError::TooFewColors(1))
    );
}

#[test]
fn test_missing_endpoints() {
    let points = BTreeMap::from([(0, RED), (50, GREEN)]);
    assert_eq!(
        ColorRamp::from_control_points("half", true, points),
        Err(RampError::MissingEndpoint(100))
    );
    let points = BTreeMap::from([(10, RED), (100, GREEN)]);
    assert_eq!(
        ColorRamp::from_control_points("half", true, points),
        Err(RampError::MissingEndpoint(0))
    );
}

#[test]
fn test_key_above_hundred() {
    let points = BTreeMap::from([(0, RED), (100, GREEN), (120, BLUE)]);
    assert_eq!(
        ColorRamp::from_control_points("over", true, points),
        Err(RampError::KeyOutOfRange(120))
    );
}

#[test]
fn test_channel_tuples() {
    let tuples = BTreeMap::from([
        (0, vec![0.0, 1.0, 0.0]),
        (100, vec![1.0, 0.0, 0.0, 0.5]),
    ]);
    let ramp = ColorRamp::from_channel_tuples("tuples", true, tuples).expect("valid");
    assert_eq!(ramp.color_at(0.0), GREEN);
    assert_eq!(ramp.color_at(1.0), Srgba::new(1.0, 0.0, 0.0, 0.5));

    let tuples = BTreeMap::from([(0, vec![0.0, 1.0]), (100, vec![1.0, 0.0, 0.0])]);
    assert_eq!(
        ColorRamp::from_channel_tuples("short", true, tuples),
        Err(RampError::BadChannelCount { key: 0, len: 2 })
    );
}

#[test]
fn test_editable_key_limit() {
    let colors = vec![RED; MAX_EDITABLE_KEYS + 1];
    assert!(matches!(
        ColorRamp::evenly_spaced("crowded", true, &colors),
        Err(RampError::TooManyKeys { .. })
    ));
    assert!(ColorRamp::evenly_spaced("crowded", false, &colors).is_ok());
}

// ---------------------------------------------------------------------------
// registry
// ---------------------------------------------------------------------------

#[test]
fn test_builtins_registered() {
    let registry = RampRegistry::default();
    for name in ["green-red", "blue-red", "viridis", "cividis", "plasma", "inferno", "magma"] {
        let ramp = registry.get(name).unwrap_or_else(|| panic!("missing {name}"));
        assert!(!ramp.is_editable());
    }
    assert_eq!(registry.editable().count(), 0);
}

#[test]
fn test_duplicate_and_blank_names_rejected() {
    let mut registry = RampRegistry::default();
    let before = registry.len();
    assert_eq!(
        registry
            .create_evenly_spaced("viridis", true, &[RED, GREEN])
            .err(),
        Some(RampError::DuplicateName("viridis".into()))
    );
    assert_eq!(
        registry.create_evenly_spaced("  ", true, &[RED, GREEN]).err(),
        Some(RampError::BlankName)
    );
    assert_eq!(registry.len(), before);
}

#[test]
fn test_create_then_delete_editable() {
    let mut registry = RampRegistry::default();
    registry
        .create_from_points("mine", true, BTreeMap::from([(0, BLUE), (100, GREEN)]))
        .expect("created");
    assert_eq!(registry.editable().count(), 1);
    assert!(registry.delete("mine"));
    assert!(registry.get("mine").is_none());
}

#[test]
fn test_builtin_cannot_be_deleted_or_overwritten() {
    let mut registry = RampRegistry::default();
    assert!(!registry.delete("cividis"));
    assert!(registry.get("cividis").is_some());

    let imposter = ColorRamp::evenly_spaced("cividis", true, &[RED, GREEN]).expect("valid");
    assert_eq!(
        registry.save_editable(imposter),
        Err(RampError::BuiltIn("cividis".into()))
    );
}

#[test]
fn test_save_editable_replaces() {
    let mut registry = RampRegistry::default();
    let first = ColorRamp::evenly_spaced("mine", true, &[RED, GREEN]).expect("valid");
    let second = ColorRamp::evenly_spaced("mine", true, &[BLUE, GREEN]).expect("valid");
    registry.save_editable(first).expect("saved");
    registry.save_editable(second).expect("replaced");
    assert_eq!(registry.resolve("mine").color_at(0.0), BLUE);
    assert_eq!(registry.editable().count(), 1);
}

#[test]
fn test_resolve_unknown_falls_back_to_default() {
    let registry = RampRegistry::default();
    assert_eq!(registry.resolve("no such ramp").name(), DEFAULT_RAMP);
}

#[test]
fn test_clear_editable_keeps_builtins() {
    let mut registry = RampRegistry::default();
    let builtins = registry.len();
    registry
        .create_evenly_spaced("mine", true, &[RED, GREEN])
        .expect("created");
    registry.clear_editable();
    assert_eq!(registry.len(), builtins);
}

#[test]
fn test_hex_formatting() {
    assert_eq!(to_hex(GREEN), "#00FF00");
    assert_eq!(to_hex(Srgba::new(1.0, 0.0, 0.0, 0.5)), "#FF000080");
    let parsed = Srgba::hex(to_hex(Srgba::rgb(0.2, 0.4, 0.6))).expect("parse");
    assert_color_near(parsed, Srgba::rgb(0.2, 0.4, 0.6));
}
