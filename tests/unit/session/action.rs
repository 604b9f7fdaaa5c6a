use super::*;
use crate::foundation::error::Prerequisite;
use crate::transform::placement::PlacementState;

fn write_png(dir: &Path, name: &str, img: image::RgbaImage) {
    img.save(dir.join(name)).unwrap();
}

fn fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_png(
        dir.path(),
        "body.png",
        image::RgbaImage::from_pixel(30, 20, image::Rgba([90, 60, 40, 255])),
    );
    write_png(
        dir.path(),
        "design.png",
        image::RgbaImage::from_fn(12, 12, |x, y| {
            if (4..8).contains(&x) && (4..8).contains(&y) {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        }),
    );
    dir
}

#[test]
fn parses_every_op() {
    let script = r#"[
        { "op": "load_body", "path": "body.png" },
        { "op": "load_design", "path": "design.png" },
        { "op": "remove_background" },
        { "op": "remove_background", "threshold": 50, "push_undo": false },
        { "op": "place", "update": { "dx": 3, "scale": 1.5 }, "gesture_end": true },
        { "op": "drag", "from": { "x": 0, "y": 0 }, "to": { "x": 5, "y": -2 } },
        { "op": "rotate", "direction": "right" },
        { "op": "undo" },
        { "op": "reset" },
        { "op": "toggle_body_edit" },
        { "op": "set_stage", "width": 10, "height": 8 }
    ]"#;
    let actions = parse_script(script).unwrap();
    assert_eq!(actions.len(), 11);
    assert_eq!(
        actions[2],
        Action::RemoveBackground {
            threshold: None,
            push_undo: true
        }
    );
    match &actions[4] {
        Action::Place {
            update,
            gesture_end,
        } => {
            assert_eq!(update.dx, 3.0);
            assert_eq!(update.scale, Some(1.5));
            assert!(*gesture_end);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn unknown_op_and_unknown_update_fields_are_rejected() {
    assert!(parse_script(r#"[{ "op": "explode" }]"#).is_err());
    assert!(parse_script(r#"[{ "op": "place", "update": { "zoom": 2 } }]"#).is_err());
}

#[test]
fn replay_drives_the_session() {
    let dir = fixture_dir();
    let actions = parse_script(
        r#"[
            { "op": "load_body", "path": "body.png" },
            { "op": "load_design", "path": "design.png" },
            { "op": "remove_background" },
            { "op": "drag", "from": { "x": 10, "y": 10 }, "to": { "x": 14, "y": 7 } },
            { "op": "rotate", "direction": "left" }
        ]"#,
    )
    .unwrap();

    let mut s = Session::default();
    s.replay(&actions, dir.path()).unwrap();

    assert_eq!(s.processed_design().unwrap().width(), 4);
    let p = s.placement();
    assert_eq!((p.x, p.y, p.rotate_deg), (4.0, -3.0, -5.0));
    assert_eq!(s.undo_depth(), 3);

    s.apply(&Action::Undo, dir.path()).unwrap();
    assert_eq!(s.placement().rotate_deg, 0.0);
}

#[test]
fn replay_stops_at_the_first_failure() {
    let dir = fixture_dir();
    let actions = vec![
        Action::LoadDesign {
            path: "design.png".into(),
        },
        Action::RemoveBackground {
            threshold: Some(30),
            push_undo: true,
        },
        Action::Place {
            update: PlacementUpdate::translate_to(9.0, 9.0),
            gesture_end: true,
        },
    ];

    let mut s = Session::default();
    let err = s.replay(&actions, dir.path()).unwrap_err();
    assert!(matches!(
        err,
        ImageError::MissingPrerequisite(Prerequisite::Body)
    ));
    assert_eq!(s.placement(), PlacementState::IDENTITY);
    assert_eq!(s.processed_design().unwrap().width(), 12);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = Session::default();
    let err = s
        .apply(
            &Action::LoadBody {
                path: "nope.png".into(),
            },
            dir.path(),
        )
        .unwrap_err();
    assert!(matches!(err, ImageError::Other(_)));
}

#[test]
fn set_stage_rejects_zero() {
    let mut s = Session::default();
    let err = s
        .apply(
            &Action::SetStage {
                width: 0,
                height: 4,
            },
            Path::new("."),
        )
        .unwrap_err();
    assert!(matches!(err, ImageError::RenderFailure(_)));
}
