//! MTL material library parser.

use std::path::Path;

use crate::error::{AssetError, AssetResult};
use crate::material::{Material, MaterialSlot};

/// Parse an MTL library. Map paths are joined onto `base`, the library's
/// directory relative to the model file (empty when they share a directory).
pub fn parse_mtl(contents: &str, base: &Path) -> AssetResult<Vec<Material>> {
    let mut materials: Vec<Material> = Vec::new();

    for (line_no, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        if tag == "newmtl" {
            let name = parts.collect::<Vec<_>>().join(" ");
            if name.is_empty() {
                return Err(AssetError::parse(line_no, "newmtl without a name"));
            }
            materials.push(Material::new(name));
            continue;
        }

        let material = materials
            .last_mut()
            .ok_or_else(|| AssetError::parse(line_no, format!("'{tag}' before any newmtl")))?;

        match tag {
            "Ka" => material.ambient = parse_color(parts, line_no, tag)?,
            "Kd" => material.diffuse = parse_color(parts, line_no, tag)?,
            "Ks" => material.specular = parse_color(parts, line_no, tag)?,
            "Ke" => material.emissive = parse_color(parts, line_no, tag)?,
            "Ns" => material.shininess = parse_f32(parts.next(), line_no, "shininess")?,
            "d" => material.opacity = parse_f32(parts.next(), line_no, "dissolve")?,
            "Tr" => material.opacity = 1.0 - parse_f32(parts.next(), line_no, "transparency")?,
            "illum" => {
                let token = parts
                    .next()
                    .ok_or_else(|| AssetError::parse(line_no, "Missing illumination model"))?;
                let model = token.parse::<u32>().map_err(|e| {
                    AssetError::parse(line_no, format!("Invalid illumination model '{token}': {e}"))
                })?;
                material.illumination = Some(model);
            }
            _ => match MaterialSlot::from_mtl_keyword(tag) {
                Some(slot) => {
                    // Option flags (-bm 1, -s 1 1 1, ...) precede the file name.
                    let file = parts.last().ok_or_else(|| {
                        AssetError::parse(line_no, format!("'{tag}' without a texture path"))
                    })?;
                    material.maps.insert(slot, base.join(file));
                }
                None => {
                    log::debug!("MTL line {}: ignoring '{}'", line_no + 1, tag);
                }
            },
        }
    }

    Ok(materials)
}

fn parse_color<'a>(
    mut parts: impl Iterator<Item = &'a str>,
    line_no: usize,
    what: &str,
) -> AssetResult<[f32; 3]> {
    let r = parse_f32(parts.next(), line_no, what)?;
    // A single value applies to all three channels.
    match parts.next() {
        None => Ok([r, r, r]),
        Some(g) => {
            let g = parse_f32(Some(g), line_no, what)?;
            let b = parse_f32(parts.next(), line_no, what)?;
            Ok([r, g, b])
        }
    }
}

pub(crate) fn parse_f32(value: Option<&str>, line_no: usize, what: &str) -> AssetResult<f32> {
    let token = value.ok_or_else(|| AssetError::parse(line_no, format!("Missing {what}")))?;
    token
        .parse::<f32>()
        .map_err(|e| AssetError::parse(line_no, format!("Failed to parse {what} '{token}': {e}")))
}
