//! Model aggregate and the file-level load entry points.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use corelib::Skeleton;

use crate::error::{AssetError, AssetResult, decode_text};
use crate::material::Material;
use crate::mesh::MeshData;
use crate::obj::{MaterialResolver, ObjData, WorkingDirResolver, parse_obj_with};
use crate::workdir::WorkingDirGuard;

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    /// Treat an unresolvable `mtllib` as a load failure instead of a warning.
    pub require_materials: bool,
}

/// Loaded model: owns its meshes, materials and bone hierarchy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model {
    pub meshes: Vec<MeshData>,
    pub materials: Vec<Material>,
    pub skeleton: Skeleton,
    /// Absolute path of the file the model was loaded from, if any.
    pub source: Option<PathBuf>,
}

impl Model {
    pub fn from_obj(data: ObjData) -> Self {
        Self {
            meshes: data.meshes,
            materials: data.materials,
            ..Self::default()
        }
    }

    pub fn with_skeleton(mut self, skeleton: Skeleton) -> Self {
        self.skeleton = skeleton;
        self
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Material bound to `mesh`, if it has a resolvable one.
    pub fn material_of(&self, mesh: &MeshData) -> Option<&Material> {
        mesh.material.and_then(|i| self.materials.get(i))
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }
}

/// Load an OBJ model, resolving material libraries relative to the model file.
pub fn load_model(path: impl AsRef<Path>, options: &LoadOptions) -> AssetResult<Model> {
    load_model_with(path, options, &mut WorkingDirResolver)
}

/// Load an OBJ model with a caller-supplied material resolver. The resolver
/// runs while the working directory is the model's directory.
///
/// On any error no model is returned and the working directory is the same
/// as before the call.
pub fn load_model_with(
    path: impl AsRef<Path>,
    options: &LoadOptions,
    resolver: &mut impl MaterialResolver,
) -> AssetResult<Model> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| AssetError::filesystem(path, e))?;
    let contents = decode_text(bytes, path)?;
    let source = std::path::absolute(path).map_err(|e| AssetError::filesystem(path, e))?;
    let dir = path.parent().unwrap_or(Path::new(""));

    let guard = WorkingDirGuard::enter(dir)?;
    let mut data = parse_obj_with(&contents, resolver, options)?;
    // Relative paths stop resolving once the guard restores the directory.
    let base = env::current_dir().map_err(|e| AssetError::filesystem(dir, e))?;
    for material in &mut data.materials {
        material.rebase_maps(|p| base.join(p));
    }
    guard.exit()?;

    let model = Model {
        source: Some(source),
        ..Model::from_obj(data)
    };
    log::info!(
        "Loaded model {}: {} meshes, {} materials, {} vertices, {} triangles",
        path.display(),
        model.meshes.len(),
        model.materials.len(),
        model.vertex_count(),
        model.triangle_count()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialSlot;
    use crate::workdir;

    const BOX_OBJ: &str = r#"
        mtllib box.mtl
        o box
        v -1 -1 0
        v  1 -1 0
        v  1  1 0
        v -1  1 0
        vt 0 0
        vt 1 0
        vt 1 1
        vt 0 1
        vn 0 0 1
        usemtl crate
        f 1/1/1 2/2/1 3/3/1 4/4/1
    "#;

    const BOX_MTL: &str = "newmtl crate\nKd 0.8 0.8 0.8\nmap_Kd box.png\nmap_Ks /abs/spec.png\n";

    fn write_box(dir: &Path) -> PathBuf {
        let model_dir = dir.join("models");
        fs::create_dir(&model_dir).unwrap();
        fs::write(model_dir.join("box.obj"), BOX_OBJ).unwrap();
        fs::write(model_dir.join("box.mtl"), BOX_MTL).unwrap();
        model_dir
    }

    #[test]
    fn loads_library_next_to_model_from_other_directory() {
        let _lock = workdir::lock();
        let original = env::current_dir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let model_dir = write_box(root.path());
        let elsewhere = root.path().join("elsewhere");
        fs::create_dir(&elsewhere).unwrap();
        env::set_current_dir(&elsewhere).unwrap();
        let before = env::current_dir().unwrap();

        let result = load_model(model_dir.join("box.obj"), &LoadOptions::default());
        let after = env::current_dir().unwrap();
        env::set_current_dir(&original).unwrap();

        let model = result.expect("box loads");
        assert_eq!(after, before);
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 2);
        let material = model.material_of(&model.meshes[0]).expect("crate material");
        assert_eq!(material.name, "crate");
        let diffuse = material.map(MaterialSlot::Diffuse).unwrap();
        assert!(diffuse.is_absolute());
        assert_eq!(diffuse, model_dir.canonicalize().unwrap().join("box.png"));
        assert_eq!(
            material.map(MaterialSlot::Specular).unwrap(),
            Path::new("/abs/spec.png")
        );
    }

    #[test]
    fn relative_model_path_is_resolved_against_caller_directory() {
        let _lock = workdir::lock();
        let original = env::current_dir().unwrap();
        let root = tempfile::tempdir().unwrap();
        write_box(root.path());
        env::set_current_dir(root.path()).unwrap();

        let result = load_model("models/box.obj", &LoadOptions::default());
        let after = env::current_dir().unwrap();
        env::set_current_dir(&original).unwrap();

        let model = result.expect("relative path loads");
        assert_eq!(after, root.path().canonicalize().unwrap());
        assert!(model.source.as_ref().unwrap().is_absolute());
        assert_eq!(model.materials.len(), 1);
    }

    #[test]
    fn parse_failure_restores_directory_and_returns_no_model() {
        let _lock = workdir::lock();
        let before = env::current_dir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("broken.obj");
        fs::write(&path, "mtllib box.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();

        let err = load_model(&path, &LoadOptions::default()).expect_err("no faces");
        assert!(err.is_parse());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn missing_model_file_is_filesystem_error() {
        let _lock = workdir::lock();
        let before = env::current_dir().unwrap();
        let root = tempfile::tempdir().unwrap();

        let err = load_model(root.path().join("nope/box.obj"), &LoadOptions::default())
            .expect_err("missing file");
        assert!(matches!(err, AssetError::Filesystem { .. }));
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn injected_resolver_runs_inside_model_directory() {
        let _lock = workdir::lock();
        let before = env::current_dir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let model_dir = write_box(root.path());

        let mut seen_dir = None;
        let mut resolver = |name: &str| -> AssetResult<String> {
            seen_dir = Some(env::current_dir().unwrap());
            assert_eq!(name, "box.mtl");
            Ok("newmtl crate\n".to_owned())
        };
        let model = load_model_with(
            model_dir.join("box.obj"),
            &LoadOptions::default(),
            &mut resolver,
        )
        .expect("loads");

        assert_eq!(seen_dir.unwrap(), model_dir.canonicalize().unwrap());
        assert!(model.materials[0].maps.is_empty());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn required_missing_library_fails_and_restores_directory() {
        let _lock = workdir::lock();
        let before = env::current_dir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("lonely.obj");
        fs::write(&path, "mtllib gone.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let options = LoadOptions {
            require_materials: true,
        };
        let err = load_model(&path, &options).expect_err("library is required");
        match err {
            AssetError::MaterialNotFound { name, .. } => assert_eq!(name, "gone.mtl"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(env::current_dir().unwrap(), before);

        // Without the requirement the same model loads with no materials.
        let model = load_model(&path, &LoadOptions::default()).expect("optional library");
        assert!(model.materials.is_empty());
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn invalid_utf8_model_is_parse_error() {
        let _lock = workdir::lock();
        let before = env::current_dir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("latin1.obj");
        fs::write(&path, b"v 0 0 0\nv 1 0 0\nv 0 1 0\no caf\xe9\nf 1 2 3\n").unwrap();

        let err = load_model(&path, &LoadOptions::default()).expect_err("not UTF-8");
        assert!(err.is_parse(), "{err}");
        assert!(matches!(err, AssetError::Parse { line: 4, .. }), "{err}");
        assert_eq!(env::current_dir().unwrap(), before);
    }

    #[test]
    fn invalid_utf8_library_is_parse_error_even_when_optional() {
        let _lock = workdir::lock();
        let before = env::current_dir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let model_dir = write_box(root.path());
        fs::write(model_dir.join("box.mtl"), b"newmtl crate\nmap_Kd \xff.png\n").unwrap();

        let err = load_model(model_dir.join("box.obj"), &LoadOptions::default())
            .expect_err("library is not UTF-8");
        assert!(err.is_parse(), "{err}");
        assert_eq!(env::current_dir().unwrap(), before);
    }
}
