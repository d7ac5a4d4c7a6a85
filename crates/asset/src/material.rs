//! Material records produced from MTL libraries.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Texture slot a material map is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MaterialSlot {
    Ambient,
    Diffuse,
    Specular,
    SpecularHighlight,
    Alpha,
    Normal,
    Displacement,
    Emissive,
}

impl MaterialSlot {
    pub const ALL: [MaterialSlot; 8] = [
        Self::Ambient,
        Self::Diffuse,
        Self::Specular,
        Self::SpecularHighlight,
        Self::Alpha,
        Self::Normal,
        Self::Displacement,
        Self::Emissive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::Diffuse => "diffuse",
            Self::Specular => "specular",
            Self::SpecularHighlight => "specular_highlight",
            Self::Alpha => "alpha",
            Self::Normal => "normal",
            Self::Displacement => "displacement",
            Self::Emissive => "emissive",
        }
    }

    /// Maps an MTL map statement keyword to its slot.
    pub fn from_mtl_keyword(keyword: &str) -> Option<Self> {
        let slot = match keyword {
            "map_Ka" => Self::Ambient,
            "map_Kd" => Self::Diffuse,
            "map_Ks" => Self::Specular,
            "map_Ns" => Self::SpecularHighlight,
            "map_d" => Self::Alpha,
            "map_Bump" | "map_bump" | "bump" | "norm" => Self::Normal,
            "disp" => Self::Displacement,
            "map_Ke" => Self::Emissive,
            _ => return None,
        };
        Some(slot)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub emissive: [f32; 3],
    pub shininess: f32,
    /// 1.0 is fully opaque.
    pub opacity: f32,
    pub illumination: Option<u32>,
    pub maps: BTreeMap<MaterialSlot, PathBuf>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn map(&self, slot: MaterialSlot) -> Option<&Path> {
        self.maps.get(&slot).map(PathBuf::as_path)
    }

    /// Rewrites every map path through `f`.
    pub fn rebase_maps(&mut self, mut f: impl FnMut(&Path) -> PathBuf) {
        for path in self.maps.values_mut() {
            *path = f(path);
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: [0.0; 3],
            diffuse: [1.0; 3],
            specular: [0.0; 3],
            emissive: [0.0; 3],
            shininess: 0.0,
            opacity: 1.0,
            illumination: None,
            maps: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_names_are_unique() {
        let mut names: Vec<_> = MaterialSlot::ALL.iter().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), MaterialSlot::ALL.len());
    }

    #[test]
    fn bump_aliases_share_normal_slot() {
        for kw in ["map_Bump", "bump", "norm"] {
            assert_eq!(MaterialSlot::from_mtl_keyword(kw), Some(MaterialSlot::Normal));
        }
        assert_eq!(MaterialSlot::from_mtl_keyword("Kd"), None);
    }
}
