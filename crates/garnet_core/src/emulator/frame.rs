use crate::emulator::ppu::RGBA;
use std::ops::{Deref, DerefMut};

/// The 240x160 output frame, 4 bytes per pixel in R,G,B,A order.
#[derive(Debug, Clone)]
#[repr(transparent)]
pub struct RgbaFrame(pub Box<[RGBA; crate::FRAMEBUFFER_SIZE]>);

impl Default for RgbaFrame {
    fn default() -> Self {
        Self(crate::box_array![RGBA::default(); crate::FRAMEBUFFER_SIZE])
    }
}

impl Deref for RgbaFrame {
    type Target = [RGBA; crate::FRAMEBUFFER_SIZE];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for RgbaFrame {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl RgbaFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// View the frame as raw bytes, e.g. for handing to a texture upload.
    ///
    /// # Safety
    ///
    /// Safe so long as [RGBA] remains `#[repr(C)]` with four byte-sized fields.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: RGBA is #[repr(C)] and the array is contiguous, so the reinterpreted
        // slice stays in bounds.
        unsafe {
            std::slice::from_raw_parts(
                self.0.as_ptr() as *const u8,
                crate::FRAMEBUFFER_SIZE * core::mem::size_of::<RGBA>(),
            )
        }
    }
}
