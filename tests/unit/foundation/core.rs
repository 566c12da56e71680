use super::*;

#[test]
fn viewport_rejects_empty_or_inverted_extents() {
    assert!(Viewport::new(-2.0, 1.0, -1.2, 1.2).is_ok());
    assert!(Viewport::new(1.0, 1.0, -1.2, 1.2).is_err());
    assert!(Viewport::new(-2.0, 1.0, 1.2, -1.2).is_err());
    assert!(Viewport::new(f64::NAN, 1.0, -1.2, 1.2).is_err());
    assert!(Viewport::new(-2.0, f64::INFINITY, -1.2, 1.2).is_err());
}

#[test]
fn viewport_extents_and_center() {
    let v = Viewport::new(-2.0, 1.0, -1.0, 1.0).unwrap();
    assert_eq!(v.width(), 3.0);
    assert_eq!(v.height(), 2.0);
    assert_eq!(v.center(), (-0.5, 0.0));
}

#[test]
fn render_settings_reject_zero_values() {
    assert!(RenderSettings::new(800, 600, 1000).is_ok());
    assert!(RenderSettings::new(0, 600, 1000).is_err());
    assert!(RenderSettings::new(800, 0, 1000).is_err());
    assert!(RenderSettings::new(800, 600, 0).is_err());
}

#[test]
fn parse_resolution_accepts_wxh() {
    assert_eq!(parse_resolution("800x600").unwrap(), (800, 600));
    assert_eq!(parse_resolution(" 1920X1080 ").unwrap(), (1920, 1080));
}

#[test]
fn parse_resolution_rejects_malformed_text() {
    for bad in ["800", "800x", "x600", "800*600", "axb", "0x600", "800x-1", ""] {
        let err = parse_resolution(bad).unwrap_err();
        assert!(
            matches!(err, ReelError::Validation(_)),
            "{bad:?} gave {err}"
        );
    }
}

#[test]
fn parse_center_accepts_negative_coordinates() {
    assert_eq!(parse_center("-0.7269,0.1889").unwrap(), (-0.7269, 0.1889));
    assert_eq!(parse_center(" 0.3 , 0.5 ").unwrap(), (0.3, 0.5));
}

#[test]
fn parse_center_rejects_malformed_text() {
    for bad in ["-0.7", "a,b", "1,2,3", "inf,0", ""] {
        assert!(parse_center(bad).is_err(), "{bad:?} should be rejected");
    }
}

#[test]
fn cancel_token_clones_share_state() {
    let a = CancelToken::new();
    let b = a.clone();
    assert!(!b.is_cancelled());
    a.cancel();
    assert!(b.is_cancelled());
}
