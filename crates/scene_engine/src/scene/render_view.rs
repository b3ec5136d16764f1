//! Read-only view handed to the render surface

use std::sync::Arc;

use super::scene_graph::Scene;
use crate::ecs::components::{CameraComponent, LightComponent, Material, MeshComponent};
use crate::ecs::entity::EntityId;
use crate::foundation::math::Mat4;
use crate::geometry::Geometry;

/// One drawable entity
#[derive(Debug, Clone, Copy)]
pub struct RenderItem<'a> {
    /// Source entity
    pub entity: EntityId,
    /// Entity name
    pub name: &'a str,
    /// World transform from the last update
    pub world_matrix: &'a Mat4,
    /// Shared vertex and index buffers
    pub geometry: &'a Arc<Geometry>,
    /// Surface parameters
    pub material: &'a Material,
    /// Casts shadows
    pub cast_shadow: bool,
    /// Receives shadows
    pub receive_shadow: bool,
}

/// One light with its world placement
#[derive(Debug, Clone, Copy)]
pub struct LightItem<'a> {
    /// Source entity
    pub entity: EntityId,
    /// World transform from the last update
    pub world_matrix: &'a Mat4,
    /// Light parameters
    pub light: &'a LightComponent,
}

impl Scene {
    /// Every entity active in the hierarchy with a visible mesh that has geometry
    pub fn render_view(&self) -> Vec<RenderItem<'_>> {
        self.entity_ids()
            .iter()
            .filter(|id| self.is_active_in_hierarchy(**id))
            .filter_map(|id| {
                let entity = self.entity(*id)?;
                let mesh = entity.get_component::<MeshComponent>().filter(|m| m.is_drawable())?;
                Some(RenderItem {
                    entity: *id,
                    name: &entity.name,
                    world_matrix: entity.world_matrix(),
                    geometry: mesh.geometry.as_ref()?,
                    material: &mesh.material,
                    cast_shadow: mesh.cast_shadow,
                    receive_shadow: mesh.receive_shadow,
                })
            })
            .collect()
    }

    /// Enabled lights on entities active in the hierarchy
    pub fn light_view(&self) -> Vec<LightItem<'_>> {
        self.lights()
            .iter()
            .filter(|id| self.is_active_in_hierarchy(**id))
            .filter_map(|id| {
                let entity = self.entity(*id)?;
                let light = entity.get_component::<LightComponent>().filter(|l| l.enabled)?;
                Some(LightItem {
                    entity: *id,
                    world_matrix: entity.world_matrix(),
                    light,
                })
            })
            .collect()
    }

    /// View and projection matrices of the primary camera.
    ///
    /// `None` without a camera, or when its frustum or world matrix is degenerate.
    pub fn camera_matrices(&self) -> Option<(Mat4, Mat4)> {
        let id = self.primary_camera()?;
        let entity = self.entity(id)?;
        let camera = entity.get_component::<CameraComponent>()?;
        let view = entity.world_matrix().try_inverse()?;
        Some((view, camera.projection_matrix()?))
    }
}
