//! Asset loading: OBJ meshes with MTL material libraries.
//!
//! Material libraries are referenced relative to the model file, so loading
//! runs inside a [`workdir::WorkingDirGuard`] scope that switches the process
//! working directory to the model's directory and restores it on exit.

pub mod error;
pub mod material;
pub mod mesh;
pub mod model;
pub mod mtl;
pub mod obj;
pub mod workdir;

pub use error::{AssetError, AssetResult};
pub use material::{Material, MaterialSlot};
pub use mesh::{MeshData, MeshVertex, VertexSkin};
pub use model::{LoadOptions, Model, load_model, load_model_with};
pub use obj::{MaterialResolver, ObjData, WorkingDirResolver, parse_obj, parse_obj_with};
pub use workdir::WorkingDirGuard;
