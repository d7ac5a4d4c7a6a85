//! Entry point: load an OBJ model and optionally bake a demo animation.

use anyhow::{Context, Result};
use animation::{Animation, FramePose, bake, skin_model};
use asset::{LoadOptions, MaterialSlot, Model, VertexSkin, load_model};
use corelib::{Bone, Quat, Skeleton, Transform, vec3};

const DEFAULT_MODEL: &str = "assets/models/box.obj";
const DEFAULT_DEMO_FRAMES: usize = 8;

fn parse_model_arg() -> String {
    // --model=PATH, or the first bare argument
    for arg in std::env::args().skip(1) {
        if let Some(val) = arg.strip_prefix("--model=") {
            return val.to_owned();
        }
        if !arg.starts_with("--") {
            return arg;
        }
    }
    DEFAULT_MODEL.to_owned()
}

fn parse_require_materials_arg() -> bool {
    // --require-materials[=on|off], off by default
    for arg in std::env::args() {
        if arg == "--require-materials" {
            return true;
        }
        if let Some(val) = arg.strip_prefix("--require-materials=") {
            return matches!(
                val.to_ascii_lowercase().as_str(),
                "1" | "true" | "on" | "yes"
            );
        }
    }
    false
}

fn parse_bake_demo_arg() -> Option<usize> {
    // --bake-demo[=FRAMES]
    for arg in std::env::args() {
        if arg == "--bake-demo" {
            return Some(DEFAULT_DEMO_FRAMES);
        }
        if let Some(val) = arg.strip_prefix("--bake-demo=") {
            return match val.parse::<usize>() {
                Ok(frames) => Some(frames.max(1)),
                Err(_) => {
                    log::warn!(
                        "Invalid frame count '{}', using {}.",
                        val,
                        DEFAULT_DEMO_FRAMES
                    );
                    Some(DEFAULT_DEMO_FRAMES)
                }
            };
        }
    }
    None
}

fn log_model(model: &Model) {
    for (i, mesh) in model.meshes.iter().enumerate() {
        let material = model.material_of(mesh).map_or("<none>", |m| m.name.as_str());
        log::info!(
            "mesh #{} {:?}: {} vertices, {} triangles, material {}",
            i,
            mesh.name.as_deref().unwrap_or(""),
            mesh.vertices.len(),
            mesh.triangle_count(),
            material
        );
    }
    for material in &model.materials {
        for slot in MaterialSlot::ALL {
            if let Some(path) = material.map(slot) {
                log::info!(
                    "material {}: {} -> {}",
                    material.name,
                    slot.as_str(),
                    path.display()
                );
            }
        }
    }
}

/// Two-bone rig: vertices below the origin follow "base", the rest "top".
fn rig_two_bones(model: Model) -> Result<Model> {
    let skeleton = Skeleton::new(vec![
        Bone::root("base", Transform::identity()),
        Bone::new("top", Some(0), Transform::identity()),
    ])
    .context("Failed to build demo skeleton")?;

    let mut model = model.with_skeleton(skeleton);
    for mesh in &mut model.meshes {
        for vertex in &mut mesh.vertices {
            let bone = if vertex.position[1] < 0.0 { 0 } else { 1 };
            vertex.skin = Some(VertexSkin {
                bones: [bone, 0, 0, 0],
                weights: [1.0, 0.0, 0.0, 0.0],
            });
        }
    }
    Ok(model)
}

/// Top bone twists a quarter turn about Y and rises over the animation.
fn twist_animation(frames: usize) -> Animation {
    let poses = (0..frames)
        .map(|f| {
            let t = f as f32 / frames.max(2).saturating_sub(1) as f32;
            FramePose::new().with(
                1,
                Transform::from_srt(
                    vec3(1.0, 1.0, 1.0),
                    Quat::from_rotation_y(t * std::f32::consts::FRAC_PI_2),
                    vec3(0.0, t * 0.5, 0.0),
                ),
            )
        })
        .collect();
    Animation::new("twist", poses)
}

fn run_bake_demo(model: Model, frames: usize) -> Result<()> {
    let model = rig_two_bones(model)?;
    let animation = twist_animation(frames);
    let table = bake(&model, &animation);
    log::info!(
        "Baked '{}': {} frames x {} bones",
        animation.name,
        table.frame_count(),
        table.bone_count()
    );

    for frame in 0..table.frame_count() {
        let meshes = skin_model(&model, &table, frame);
        let bounds = meshes.iter().filter_map(|m| m.bounds()).reduce(
            |(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)),
        );
        if let Some((min, max)) = bounds {
            log::info!("frame {:>3}: bounds {} .. {}", frame, min, max);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let model_path = parse_model_arg();
    let options = LoadOptions {
        require_materials: parse_require_materials_arg(),
    };
    let bake_frames = parse_bake_demo_arg();
    log::info!(
        "Loading {} (require_materials={}, bake_demo={:?})",
        model_path,
        options.require_materials,
        bake_frames
    );

    let model = load_model(&model_path, &options)
        .with_context(|| format!("Failed to load model {}", model_path))?;
    log_model(&model);

    if let Some(frames) = bake_frames {
        run_bake_demo(model, frames)?;
    }

    log::info!("Done.");
    Ok(())
}
