// Host-side tests for configuration and item deserialization.

use chrono::{Datelike, Timelike};
use menu_core::{MenuConfig, MenuItem};

#[test]
fn partial_config_keeps_defaults() {
    let cfg: MenuConfig = serde_json::from_str(r#"{ "drag_sensitivity": 0.01 }"#).unwrap();
    let d = MenuConfig::default();
    assert_eq!(cfg.drag_sensitivity, 0.01);
    assert_eq!(cfg.min_anchors, d.min_anchors);
    assert_eq!(cfg.inertia_retain_per_sec, d.inertia_retain_per_sec);
}

#[test]
fn empty_object_is_default() {
    let cfg: MenuConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, MenuConfig::default());
}

#[test]
fn sanitized_clamps_damping_into_open_unit_interval() {
    let cfg = MenuConfig {
        inertia_retain_per_sec: 1.5,
        settle_epsilon: -1.0,
        tile_fill: 3.0,
        ..MenuConfig::default()
    }
    .sanitized();
    assert!(cfg.inertia_retain_per_sec < 1.0);
    assert!(cfg.settle_epsilon > 0.0);
    assert_eq!(cfg.tile_fill, 1.0);

    let cfg = MenuConfig {
        inertia_retain_per_sec: 0.0,
        ..MenuConfig::default()
    }
    .sanitized();
    assert!(cfg.inertia_retain_per_sec > 0.0);
}

#[test]
fn defaults_survive_sanitizing() {
    assert_eq!(MenuConfig::default().sanitized(), MenuConfig::default());
}

#[test]
fn items_parse_with_optional_fields() {
    let json = r#"[
        { "image": "a.jpg", "title": "Alpha", "date": "2024-03-05T10:30:00Z",
          "link": "https://example.com/a", "locale": "de-DE" },
        { "image": "b.jpg", "title": "Beta", "date": "2023-12-31T23:59:59+00:00" }
    ]"#;
    let items: Vec<MenuItem> = serde_json::from_str(json).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].locale, "de-DE");
    assert_eq!(items[0].date.month(), 3);
    assert_eq!(items[0].date.hour(), 10);
    assert_eq!(items[1].link, None);
    assert_eq!(items[1].locale, "en-US");
    assert_eq!(items[1].date.year(), 2023);
}

#[test]
fn item_without_date_is_rejected() {
    let json = r#"{ "image": "a.jpg", "title": "Alpha" }"#;
    assert!(serde_json::from_str::<MenuItem>(json).is_err());
}

#[test]
fn oversized_min_anchors_is_capped() {
    let json = format!(r#"{{ "min_anchors": {} }}"#, u64::MAX);
    let cfg: MenuConfig = serde_json::from_str(&json).unwrap();
    let cfg = cfg.sanitized();
    assert_eq!(cfg.min_anchors, 40_962);
}

#[test]
fn non_finite_values_fall_back_to_defaults() {
    let d = MenuConfig::default();
    let cfg = MenuConfig {
        fovy_radians: f32::NAN,
        sphere_radius: f32::INFINITY,
        drag_sensitivity: f32::NEG_INFINITY,
        inertia_retain_per_sec: f32::NAN,
        ..MenuConfig::default()
    }
    .sanitized();
    assert_eq!(cfg.fovy_radians, d.fovy_radians);
    assert_eq!(cfg.sphere_radius, d.sphere_radius);
    assert_eq!(cfg.drag_sensitivity, d.drag_sensitivity);
    assert_eq!(cfg.inertia_retain_per_sec, d.inertia_retain_per_sec);
}
