use super::*;

// ============================================================================
// Stride tests
// ============================================================================

#[test]
fn test_strides() {
    assert_eq!(VertexFormat::PositionColor.stride(), 24);
    assert_eq!(VertexFormat::PositionNormalUv.stride(), 32);
    assert_eq!(VertexFormat::PositionNormalUvColor.stride(), 44);
    assert_eq!(VertexFormat::PositionNormalUv0Uv1.stride(), 40);
}

#[test]
fn test_floats_per_vertex() {
    assert_eq!(VertexFormat::PositionColor.floats_per_vertex(), 6);
    assert_eq!(VertexFormat::PositionNormalUv.floats_per_vertex(), 8);
    assert_eq!(VertexFormat::PositionNormalUvColor.floats_per_vertex(), 11);
    assert_eq!(VertexFormat::PositionNormalUv0Uv1.floats_per_vertex(), 10);
}

// ============================================================================
// Attribute layout tests
// ============================================================================

#[test]
fn test_position_color_attributes() {
    let attrs = VertexFormat::PositionColor.attributes();
    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs[0], VertexAttribute { location: 0, components: 3, offset: 0 });
    assert_eq!(attrs[1], VertexAttribute { location: 1, components: 3, offset: 12 });
}

#[test]
fn test_position_normal_uv_attributes() {
    let attrs = VertexFormat::PositionNormalUv.attributes();
    assert_eq!(attrs.len(), 3);
    assert_eq!(attrs[2], VertexAttribute { location: 2, components: 2, offset: 24 });
}

#[test]
fn test_dual_uv_attributes() {
    let attrs = VertexFormat::PositionNormalUv0Uv1.attributes();
    assert_eq!(attrs.len(), 4);
    // uv0 and uv1 are both two-component, back to back
    assert_eq!(attrs[2], VertexAttribute { location: 2, components: 2, offset: 24 });
    assert_eq!(attrs[3], VertexAttribute { location: 3, components: 2, offset: 32 });
}

#[test]
fn test_attributes_fit_within_stride() {
    for format in [
        VertexFormat::PositionColor,
        VertexFormat::PositionNormalUv,
        VertexFormat::PositionNormalUvColor,
        VertexFormat::PositionNormalUv0Uv1,
    ] {
        let stride = format.stride();
        for attr in format.attributes() {
            let end = attr.offset + attr.components * 4;
            assert!(
                end <= stride,
                "{:?}: attribute at location {} ends at {} past stride {}",
                format, attr.location, end, stride
            );
        }
    }
}

#[test]
fn test_locations_are_sequential() {
    for format in [
        VertexFormat::PositionColor,
        VertexFormat::PositionNormalUv,
        VertexFormat::PositionNormalUvColor,
        VertexFormat::PositionNormalUv0Uv1,
    ] {
        for (i, attr) in format.attributes().iter().enumerate() {
            assert_eq!(attr.location, i as u32);
        }
    }
}
