//! GPU instancing back-end.
//!
//! One [`ParticleInstance`] per live particle, laid out for direct upload as
//! an instance vertex buffer. The shader picks the shape from `shape`.

use bytemuck::{Pod, Zeroable};

/// Per-particle instance data.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// Center in pixels.
    pub position: [f32; 2],
    /// Final radius after pulse/scale.
    pub radius: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Color with final alpha (opacity * intensity) in `a`.
    pub color: [f32; 4],
    /// Shape index (visual type discriminant).
    pub shape: u32,
    /// Effect bits: glow = 1, trail = 2, pulse = 4, rotate = 8, scale = 16.
    pub flags: u32,
    /// Keeps the stride a multiple of 16 bytes.
    pub _padding: [u32; 2],
}

impl ParticleInstance {
    /// Size of an instance in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// Instance buffer rebuilt every frame.
#[derive(Debug, Clone, Default)]
pub struct InstanceBuffer {
    instances: Vec<ParticleInstance>,
}

impl InstanceBuffer {
    /// Creates a buffer with room for `capacity` instances.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    /// Drops last frame's instances, keeping the allocation.
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Appends an instance.
    pub fn push(&mut self, instance: ParticleInstance) {
        self.instances.push(instance);
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns true if there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Returns the instances.
    #[must_use]
    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    /// Returns the instances as bytes for GPU upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }
}
