//! OBJ parser supporting positions, normals, texture coordinates, groups and
//! MTL material libraries.

use std::{collections::HashMap, fs, path::Path};

use crate::error::{AssetError, AssetResult, decode_text};
use crate::material::Material;
use crate::mesh::{MeshData, MeshVertex};
use crate::model::LoadOptions;
use crate::mtl::{parse_f32, parse_mtl};

/// Directives describing free-form geometry, which this loader cannot mesh.
const FREE_FORM_DIRECTIVES: &[&str] = &[
    "cstype", "deg", "bmat", "step", "curv", "curv2", "surf", "parm", "trim", "hole", "scrv",
    "sp", "end", "con",
];

/// Supplies the text of a material library named by an `mtllib` directive.
pub trait MaterialResolver {
    fn resolve(&mut self, file_name: &str) -> AssetResult<String>;
}

impl<F> MaterialResolver for F
where
    F: FnMut(&str) -> AssetResult<String>,
{
    fn resolve(&mut self, file_name: &str) -> AssetResult<String> {
        self(file_name)
    }
}

/// Reads libraries relative to the current working directory. Only
/// meaningful inside a [`crate::WorkingDirGuard`] scope on the model's
/// directory.
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkingDirResolver;

impl MaterialResolver for WorkingDirResolver {
    fn resolve(&mut self, file_name: &str) -> AssetResult<String> {
        let bytes = fs::read(file_name).map_err(|source| AssetError::MaterialNotFound {
            name: file_name.to_owned(),
            source,
        })?;
        decode_text(bytes, Path::new(file_name))
    }
}

/// Meshes and materials parsed from one OBJ file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjData {
    pub meshes: Vec<MeshData>,
    pub materials: Vec<Material>,
}

/// Parse OBJ text with default options.
pub fn parse_obj(contents: &str, resolver: &mut impl MaterialResolver) -> AssetResult<ObjData> {
    parse_obj_with(contents, resolver, &LoadOptions::default())
}

/// Parse OBJ text. Returns either complete data or the first error.
pub fn parse_obj_with(
    contents: &str,
    resolver: &mut impl MaterialResolver,
    options: &LoadOptions,
) -> AssetResult<ObjData> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut texcoords: Vec<[f32; 2]> = Vec::new();

    let mut materials: Vec<Material> = Vec::new();
    let mut material_ids: HashMap<String, usize> = HashMap::new();

    let mut meshes: Vec<MeshData> = Vec::new();
    let mut current = MeshBuilder::default();
    let mut face_count = 0usize;
    let mut last_line = 0usize;

    for (line_no, line) in contents.lines().enumerate() {
        last_line = line_no;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                positions.push([x, y, z]);
            }
            "vt" => {
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                let v = match parts.next() {
                    Some(token) => parse_f32(Some(token), line_no, "v coordinate")?,
                    None => 0.0,
                };
                texcoords.push([u, v]);
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                normals.push([nx, ny, nz]);
            }
            "f" => {
                let mut face_indices: Vec<u32> = Vec::new();
                for part in parts {
                    let (vi, vti, vni) = parse_face_vertex(
                        part,
                        positions.len(),
                        texcoords.len(),
                        normals.len(),
                        line_no,
                    )?;
                    let position = positions[vi];
                    let uv = vti.map(|i| texcoords[i]).unwrap_or([0.0, 0.0]);
                    let normal = vni.map(|i| normals[i]).unwrap_or([0.0, 0.0, 1.0]);
                    let index = current.vertex(
                        Key(vi, vti, vni),
                        || MeshVertex::new(position, normal, uv),
                        line_no,
                    )?;
                    face_indices.push(index);
                }

                if face_indices.len() < 3 {
                    return Err(AssetError::parse(
                        line_no,
                        format!("Face needs at least 3 vertices, got {}", face_indices.len()),
                    ));
                }
                // Triangulate fan
                for tri in 1..(face_indices.len() - 1) {
                    current.indices.push(face_indices[0]);
                    current.indices.push(face_indices[tri]);
                    current.indices.push(face_indices[tri + 1]);
                }
                face_count += 1;
            }
            "o" | "g" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                let material = current.material;
                current.finish_into(&mut meshes);
                current = MeshBuilder {
                    name: (!name.is_empty()).then_some(name),
                    material,
                    ..MeshBuilder::default()
                };
            }
            "usemtl" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                let material = material_ids.get(&name).copied();
                if material.is_none() {
                    log::warn!(
                        "OBJ line {}: material '{}' is not defined by any loaded library",
                        line_no + 1,
                        name
                    );
                }
                if material != current.material {
                    let name = current.name.clone();
                    current.finish_into(&mut meshes);
                    current = MeshBuilder {
                        name,
                        material,
                        ..MeshBuilder::default()
                    };
                }
            }
            "mtllib" => {
                for library in parts {
                    load_library(
                        library,
                        resolver,
                        options,
                        &mut materials,
                        &mut material_ids,
                    )?;
                }
            }
            tag if FREE_FORM_DIRECTIVES.contains(&tag) => {
                return Err(AssetError::parse(
                    line_no,
                    format!("Unsupported primitive '{tag}' (free-form geometry)"),
                ));
            }
            _ => {
                // s/l/p and vendor extensions carry nothing we mesh.
                log::debug!("OBJ line {}: ignoring '{}'", line_no + 1, tag);
            }
        }
    }
    current.finish_into(&mut meshes);

    if face_count == 0 {
        return Err(AssetError::parse(
            last_line,
            "OBJ contained no faces (missing 'f' directive)",
        ));
    }

    Ok(ObjData { meshes, materials })
}

fn load_library(
    library: &str,
    resolver: &mut impl MaterialResolver,
    options: &LoadOptions,
    materials: &mut Vec<Material>,
    material_ids: &mut HashMap<String, usize>,
) -> AssetResult<()> {
    let text = match resolver.resolve(library) {
        Ok(text) => text,
        // A library that exists but is not text is malformed, not missing.
        Err(e) if options.require_materials || e.is_parse() => return Err(e),
        Err(e) => {
            log::warn!("Skipping material library: {e}");
            return Ok(());
        }
    };

    let base = Path::new(library).parent().unwrap_or(Path::new(""));
    let parsed = parse_mtl(&text, base).map_err(|e| match e {
        AssetError::Parse { line, message } => AssetError::Parse {
            line,
            message: format!("{library}: {message}"),
        },
        other => other,
    })?;

    for material in parsed {
        if material_ids.contains_key(&material.name) {
            log::warn!(
                "Material '{}' redefined by '{}'; using the later definition",
                material.name,
                library
            );
        }
        material_ids.insert(material.name.clone(), materials.len());
        materials.push(material);
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
struct Key(usize, Option<usize>, Option<usize>);

/// Mesh under construction: one run of faces sharing a group and material.
#[derive(Default)]
struct MeshBuilder {
    name: Option<String>,
    material: Option<usize>,
    unique: HashMap<Key, u32>,
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
}

impl MeshBuilder {
    fn vertex(
        &mut self,
        key: Key,
        make: impl FnOnce() -> MeshVertex,
        line_no: usize,
    ) -> AssetResult<u32> {
        if let Some(&idx) = self.unique.get(&key) {
            return Ok(idx);
        }
        let idx = u32::try_from(self.vertices.len()).map_err(|_| {
            AssetError::parse(line_no, format!("Too many vertices in mesh (>{})", u32::MAX))
        })?;
        self.vertices.push(make());
        self.unique.insert(key, idx);
        Ok(idx)
    }

    fn finish_into(&mut self, meshes: &mut Vec<MeshData>) {
        if self.indices.is_empty() {
            return;
        }
        let builder = std::mem::take(self);
        meshes.push(MeshData {
            name: builder.name,
            material: builder.material,
            vertices: builder.vertices,
            indices: builder.indices,
        });
    }
}

fn parse_face_vertex(
    token: &str,
    pos_count: usize,
    tex_count: usize,
    norm_count: usize,
    line_no: usize,
) -> AssetResult<(usize, Option<usize>, Option<usize>)> {
    let mut split = token.split('/');
    let pos = split.next().filter(|p| !p.is_empty()).ok_or_else(|| {
        AssetError::parse(line_no, format!("Malformed face element '{token}'"))
    })?;
    let pos_idx = resolve_index(pos, pos_count, line_no)?;

    let tex_idx = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, tex_count, line_no)?),
        _ => None,
    };

    let norm_idx = match split.next() {
        Some(value) if !value.is_empty() => Some(resolve_index(value, norm_count, line_no)?),
        _ => None,
    };

    Ok((pos_idx, tex_idx, norm_idx))
}

fn resolve_index(token: &str, len: usize, line_no: usize) -> AssetResult<usize> {
    let raw = token
        .parse::<i64>()
        .map_err(|e| AssetError::parse(line_no, format!("Invalid index '{token}': {e}")))?;
    if raw == 0 {
        return Err(AssetError::parse(line_no, "OBJ indices are 1-based; found 0"));
    }

    let idx = if raw > 0 { raw - 1 } else { len as i64 + raw };

    if idx < 0 || idx as usize >= len {
        return Err(AssetError::parse(
            line_no,
            format!("OBJ index {raw} resolved out of bounds (len={len})"),
        ));
    }

    Ok(idx as usize)
}
