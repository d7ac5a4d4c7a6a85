//! CPU linear-blend skinning with baked bone matrices.

use asset::{MeshData, MeshVertex, Model};
use corelib::{Mat4, Vec3};

use crate::bake::BoneMatrixTable;

/// Deform `mesh` with one frame of bone matrices (indexed by bone id).
///
/// Vertices without skin data are copied unchanged. Influences naming a bone
/// outside `bones` are dropped and the remaining weights renormalized.
/// Normals are rotated with the bone matrices and renormalized, which is
/// exact for uniform scale only.
pub fn skin_vertices(mesh: &MeshData, bones: &[Mat4]) -> Vec<MeshVertex> {
    mesh.vertices
        .iter()
        .map(|vertex| skin_vertex(vertex, bones))
        .collect()
}

fn skin_vertex(vertex: &MeshVertex, bones: &[Mat4]) -> MeshVertex {
    let Some(skin) = vertex.skin else {
        return *vertex;
    };

    let influences: Vec<(&Mat4, f32)> = skin
        .bones
        .iter()
        .zip(skin.weights)
        .filter(|&(_, w)| w > 0.0)
        .filter_map(|(&b, w)| bones.get(b as usize).map(|m| (m, w)))
        .collect();
    let total: f32 = influences.iter().map(|&(_, w)| w).sum();
    if total <= 0.0 {
        return *vertex;
    }

    let position = Vec3::from(vertex.position);
    let normal = Vec3::from(vertex.normal);
    let mut skinned_position = Vec3::ZERO;
    let mut skinned_normal = Vec3::ZERO;
    for (matrix, weight) in influences {
        let w = weight / total;
        skinned_position += matrix.transform_point3(position) * w;
        skinned_normal += matrix.transform_vector3(normal) * w;
    }

    let skinned_normal = skinned_normal.try_normalize().unwrap_or(normal);
    MeshVertex {
        position: skinned_position.to_array(),
        normal: skinned_normal.to_array(),
        ..*vertex
    }
}

/// Skin every mesh of `model` with `frame` of `table`, looping past the end.
/// Returns the meshes unchanged when the table is empty.
pub fn skin_model(model: &Model, table: &BoneMatrixTable, frame: usize) -> Vec<MeshData> {
    let Some(bones) = table.frame_wrapped(frame) else {
        return model.meshes.clone();
    };
    model
        .meshes
        .iter()
        .map(|mesh| MeshData {
            vertices: skin_vertices(mesh, bones),
            ..mesh.clone()
        })
        .collect()
}
