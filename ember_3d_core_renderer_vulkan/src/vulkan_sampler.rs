/// SamplerCache — internal VkSampler management for the Vulkan backend
///
/// Creates and caches VkSampler objects on first use. The render core only
/// needs one sampler per texture family, so the cache stays tiny.

use crate::vulkan_context::GpuContext;
use ash::vk;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Sampler families used by the texture manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SamplerKind {
    /// Linear filtering, repeat addressing — color textures
    LinearRepeat,
    /// Linear filtering, clamp-to-edge addressing — linear-format
    /// (displacement) textures, where wrapping would bleed across seams
    LinearClamp,
}

/// Internal sampler cache — creates VkSampler on first use, destroys on shutdown/drop
pub(crate) struct SamplerCache {
    ctx: Option<Arc<GpuContext>>,
    cache: FxHashMap<SamplerKind, vk::Sampler>,
}

impl SamplerCache {
    pub(crate) fn new(ctx: Arc<GpuContext>) -> Self {
        Self {
            ctx: Some(ctx),
            cache: FxHashMap::default(),
        }
    }

    /// Get or create a VkSampler for the given kind
    pub(crate) fn get(&mut self, kind: SamplerKind) -> vk::Sampler {
        if let Some(&sampler) = self.cache.get(&kind) {
            return sampler;
        }

        let ctx = self.ctx.as_ref().expect("SamplerCache used after shutdown");
        let sampler = Self::create_vk_sampler(ctx, kind);
        self.cache.insert(kind, sampler);
        sampler
    }

    /// Destroy all cached VkSamplers and release the GpuContext reference.
    /// Must be called during RenderCore::drop() while the device is still alive.
    pub(crate) fn shutdown(&mut self) {
        if let Some(ctx) = &self.ctx {
            for (_, sampler) in self.cache.drain() {
                unsafe { ctx.device.destroy_sampler(sampler, None); }
            }
        }
        self.ctx = None;
    }

    fn create_vk_sampler(ctx: &GpuContext, kind: SamplerKind) -> vk::Sampler {
        let address_mode = match kind {
            SamplerKind::LinearRepeat => vk::SamplerAddressMode::REPEAT,
            SamplerKind::LinearClamp => vk::SamplerAddressMode::CLAMP_TO_EDGE,
        };

        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .address_mode_u(address_mode)
            .address_mode_v(address_mode)
            .address_mode_w(address_mode)
            .mip_lod_bias(0.0)
            .min_lod(0.0)
            .max_lod(vk::LOD_CLAMP_NONE)
            .anisotropy_enable(false)
            .max_anisotropy(1.0)
            .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS)
            .unnormalized_coordinates(false);

        unsafe {
            ctx.device.create_sampler(&create_info, None)
                .expect("Failed to create VkSampler")
        }
    }
}

impl Drop for SamplerCache {
    fn drop(&mut self) {
        // If shutdown() was called, ctx is None and cache is empty — nothing to do.
        // Otherwise, destroy remaining samplers (fallback safety).
        if let Some(ctx) = &self.ctx {
            for (_, sampler) in self.cache.drain() {
                unsafe { ctx.device.destroy_sampler(sampler, None); }
            }
        }
    }
}
