//! Per-object record handed to the renderer

use bytemuck::{Pod, Zeroable};

use super::GameObject;

/// Plain-old-data instance record, ready for a GPU buffer upload
///
/// Matrices are column-major, taken from the object's render state.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    /// Render-state model matrix
    pub model_matrix: [[f32; 4]; 4],
    /// Render-state normal matrix (inverse-transpose of the model matrix)
    pub normal_matrix: [[f32; 4]; 4],
    /// Visibility bits, see the `FLAG_*` constants
    pub flags: u32,
    /// Keeps the record a multiple of 16 bytes
    pub _padding: [u32; 3],
}

impl RenderInstance {
    /// Exact bounds are inside the frustum
    pub const FLAG_INSIDE_SCREEN_SPACE: u32 = 1 << 0;
    /// Expanded bounds are inside the frustum
    pub const FLAG_INSIDE_RENDER_PASS: u32 = 1 << 1;

    /// Build the record from an object's render state and visibility
    pub fn from_object(object: &GameObject) -> Self {
        let render = object.render();
        let status = object.screen_space();
        let mut flags = 0;
        if status.inside_screen_space {
            flags |= Self::FLAG_INSIDE_SCREEN_SPACE;
        }
        if status.inside_screen_space_for_render_pass {
            flags |= Self::FLAG_INSIDE_RENDER_PASS;
        }
        Self {
            model_matrix: (*render.model_matrix()).into(),
            normal_matrix: (*render.normal_matrix()).into(),
            flags,
            _padding: [0; 3],
        }
    }

    /// Returns `true` if the exact-bounds flag is set
    pub fn is_inside_screen_space(&self) -> bool {
        self.flags & Self::FLAG_INSIDE_SCREEN_SPACE != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culling::ScreenSpaceStatus;
    use crate::foundation::math::Vec3;
    use crate::state::EntityState;

    #[test]
    fn test_instance_layout_and_flags() {
        assert_eq!(std::mem::size_of::<RenderInstance>(), 144);

        let mut object = GameObject::new("crate", EntityState::from_position(Vec3::new(1.0, 2.0, 3.0)));
        object.set_screen_space(ScreenSpaceStatus {
            inside_screen_space: false,
            inside_screen_space_for_render_pass: true,
        });
        let instance = RenderInstance::from_object(&object);
        assert_eq!(instance.flags, RenderInstance::FLAG_INSIDE_RENDER_PASS);
        assert!(!instance.is_inside_screen_space());
        // Column-major: translation lives in the last column
        assert_eq!(instance.model_matrix[3][0..3], [1.0, 2.0, 3.0]);

        let bytes: &[u8] = bytemuck::bytes_of(&instance);
        assert_eq!(bytes.len(), 144);
    }
}
