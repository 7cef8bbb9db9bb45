//! Unit tests for Vulkan state-mapping functions
//!
//! Tests pure conversion functions without requiring GPU: fixed-function
//! enum mapping and vertex-format binding/attribute tables.

use ash::vk;
use ember_3d_core::ember3d::render::{CullMode, PolygonMode, PrimitiveTopology, VertexFormat};

use crate::vulkan_buffer::usage_to_vk;
use crate::vulkan_pipeline::{
    cull_mode_to_vk, polygon_mode_to_vk, topology_to_vk, vertex_attributes_to_vk,
    vertex_binding_to_vk,
};
use ember_3d_core::ember3d::render::BufferUsage;

// ============================================================================
// FIXED-FUNCTION STATE MAPPING TESTS
// ============================================================================

#[test]
fn test_topology_mapping() {
    assert_eq!(topology_to_vk(PrimitiveTopology::PointList), vk::PrimitiveTopology::POINT_LIST);
    assert_eq!(topology_to_vk(PrimitiveTopology::LineList), vk::PrimitiveTopology::LINE_LIST);
    assert_eq!(topology_to_vk(PrimitiveTopology::TriangleList), vk::PrimitiveTopology::TRIANGLE_LIST);
    assert_eq!(topology_to_vk(PrimitiveTopology::TriangleStrip), vk::PrimitiveTopology::TRIANGLE_STRIP);
}

#[test]
fn test_polygon_mode_mapping() {
    assert_eq!(polygon_mode_to_vk(PolygonMode::Fill), vk::PolygonMode::FILL);
    assert_eq!(polygon_mode_to_vk(PolygonMode::Line), vk::PolygonMode::LINE);
    assert_eq!(polygon_mode_to_vk(PolygonMode::Point), vk::PolygonMode::POINT);
}

#[test]
fn test_cull_mode_mapping() {
    assert_eq!(cull_mode_to_vk(CullMode::None), vk::CullModeFlags::NONE);
    assert_eq!(cull_mode_to_vk(CullMode::Front), vk::CullModeFlags::FRONT);
    assert_eq!(cull_mode_to_vk(CullMode::Back), vk::CullModeFlags::BACK);
}

// ============================================================================
// BUFFER USAGE MAPPING TESTS
// ============================================================================

#[test]
fn test_buffer_usage_mapping() {
    assert_eq!(usage_to_vk(BufferUsage::VERTEX), vk::BufferUsageFlags::VERTEX_BUFFER);
    assert_eq!(usage_to_vk(BufferUsage::INDEX), vk::BufferUsageFlags::INDEX_BUFFER);
    assert_eq!(usage_to_vk(BufferUsage::UNIFORM), vk::BufferUsageFlags::UNIFORM_BUFFER);
    assert_eq!(usage_to_vk(BufferUsage::TRANSFER_SRC), vk::BufferUsageFlags::TRANSFER_SRC);
}

#[test]
fn test_buffer_usage_mapping_composes() {
    let flags = usage_to_vk(BufferUsage::VERTEX | BufferUsage::TRANSFER_SRC);
    assert!(flags.contains(vk::BufferUsageFlags::VERTEX_BUFFER));
    assert!(flags.contains(vk::BufferUsageFlags::TRANSFER_SRC));
    assert!(!flags.contains(vk::BufferUsageFlags::INDEX_BUFFER));
}

// ============================================================================
// VERTEX FORMAT TABLE TESTS
// ============================================================================

#[test]
fn test_binding_strides_match_format() {
    for format in [
        VertexFormat::PositionColor,
        VertexFormat::PositionNormalUv,
        VertexFormat::PositionNormalUvColor,
        VertexFormat::PositionNormalUv0Uv1,
    ] {
        let binding = vertex_binding_to_vk(format);
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.stride, format.stride());
        assert_eq!(binding.input_rate, vk::VertexInputRate::VERTEX);
    }
}

#[test]
fn test_position_color_attribute_formats() {
    let attrs = vertex_attributes_to_vk(VertexFormat::PositionColor);
    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs[0].format, vk::Format::R32G32B32_SFLOAT);
    assert_eq!(attrs[0].offset, 0);
    assert_eq!(attrs[1].format, vk::Format::R32G32B32_SFLOAT);
    assert_eq!(attrs[1].offset, 12);
}

#[test]
fn test_position_normal_uv_attribute_formats() {
    let attrs = vertex_attributes_to_vk(VertexFormat::PositionNormalUv);
    assert_eq!(attrs.len(), 3);
    assert_eq!(attrs[2].format, vk::Format::R32G32_SFLOAT);
    assert_eq!(attrs[2].offset, 24);
}

#[test]
fn test_dual_uv_attribute_formats() {
    let attrs = vertex_attributes_to_vk(VertexFormat::PositionNormalUv0Uv1);
    assert_eq!(attrs.len(), 4);
    // Both UV channels are two-component floats
    assert_eq!(attrs[2].format, vk::Format::R32G32_SFLOAT);
    assert_eq!(attrs[3].format, vk::Format::R32G32_SFLOAT);
    assert_eq!(attrs[3].offset, 32);
}

#[test]
fn test_attribute_locations_are_bindings_zero_and_sequential() {
    for format in [
        VertexFormat::PositionColor,
        VertexFormat::PositionNormalUv,
        VertexFormat::PositionNormalUvColor,
        VertexFormat::PositionNormalUv0Uv1,
    ] {
        for (i, attr) in vertex_attributes_to_vk(format).iter().enumerate() {
            assert_eq!(attr.binding, 0);
            assert_eq!(attr.location, i as u32);
        }
    }
}
