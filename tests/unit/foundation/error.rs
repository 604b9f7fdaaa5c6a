use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ImageError::invalid_or_too_large("x")
            .to_string()
            .contains("invalid or too large image:")
    );
    assert!(
        ImageError::decode("x")
            .to_string()
            .contains("decode failure:")
    );
    assert!(
        ImageError::render("x")
            .to_string()
            .contains("render failure:")
    );
    assert!(ImageError::config("x").to_string().contains("config error:"));
}

#[test]
fn missing_prerequisite_names_the_layer() {
    let body = ImageError::missing(Prerequisite::Body).to_string();
    assert!(body.contains("body photo"));
    let design = ImageError::missing(Prerequisite::Design).to_string();
    assert!(design.contains("tattoo design"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ImageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
