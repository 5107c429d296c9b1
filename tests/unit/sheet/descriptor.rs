use super::*;

#[test]
fn parses_wordmap_and_regions() {
    let json = r#"{
        "wordmap": { "blahaj": "babaj", "babaj": "babaj" },
        "regions": {
            "babaj": [ {"x": 0, "y": 0, "w": 24, "h": 24}, {"x": 24, "y": 0, "w": 24, "h": 24} ]
        }
    }"#;
    let d = SpritesheetDescriptor::from_json_str(json).unwrap();
    assert_eq!(d.wordmap.get("blahaj").map(String::as_str), Some("babaj"));
    let regions = d.declared("babaj").unwrap();
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[1], SpritesheetRegion::new(24, 0, 24, 24).unwrap());
}

#[test]
fn missing_size_defaults_to_cell_size() {
    let json = r#"{ "wordmap": {}, "regions": { "a": [ {"x": 48, "y": 24} ] } }"#;
    let d = SpritesheetDescriptor::from_json_str(json).unwrap();
    assert_eq!(
        d.declared("a").unwrap()[0],
        SpritesheetRegion {
            x: 48,
            y: 24,
            w: 24,
            h: 24
        }
    );
}

#[test]
fn unknown_fields_are_permitted() {
    let json = r#"{
        "version": 3,
        "wordmap": {},
        "regions": { "a": [ {"x": 0, "y": 0, "w": 1, "h": 1, "note": "idle"} ] }
    }"#;
    assert!(SpritesheetDescriptor::from_json_str(json).is_ok());
}

#[test]
fn rejects_negative_fractional_and_empty_sizes() {
    let negative = r#"{ "wordmap": {}, "regions": { "a": [ {"x": -1, "y": 0} ] } }"#;
    assert!(matches!(
        SpritesheetDescriptor::from_json_str(negative),
        Err(SmtxError::Validation(_))
    ));

    let fractional = r#"{ "wordmap": {}, "regions": { "a": [ {"x": 1.5, "y": 0} ] } }"#;
    assert!(matches!(
        SpritesheetDescriptor::from_json_str(fractional),
        Err(SmtxError::Validation(_))
    ));

    let zero = r#"{ "wordmap": {}, "regions": { "a": [ {"x": 0, "y": 0, "w": 0, "h": 4} ] } }"#;
    assert!(matches!(
        SpritesheetDescriptor::from_json_str(zero),
        Err(SmtxError::Validation(_))
    ));
}

#[test]
fn missing_top_level_fields_is_a_serde_error() {
    let json = r#"{ "regions": {} }"#;
    assert!(matches!(
        SpritesheetDescriptor::from_json_str(json),
        Err(SmtxError::Serde(_))
    ));
}

#[test]
fn region_bounds_check() {
    let r = SpritesheetRegion::new(20, 20, 4, 4).unwrap();
    assert!(r.fits_within(24, 24));
    assert!(!r.fits_within(23, 24));
    assert!(SpritesheetRegion::new(0, 0, 0, 1).is_err());
}
