use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BakeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(BakeError::io("x").to_string().contains("io error:"));
    assert!(
        BakeError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BakeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
