use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use glam::Vec3;
use log::info;
use pathlight_core::{SceneDescription, TextureCache};
use pathlight_renderer::{render, AccelOptions, Camera, RenderConfig, RtMesh, Scene};

mod cli;

use cli::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the thread pool")?;
    }

    let description = SceneDescription::from_file(&args.scene)
        .with_context(|| format!("failed to load scene {}", args.scene))?;

    let render_settings = &description.render;
    let width = args.width.unwrap_or(render_settings.width);
    let height = args.height.unwrap_or(render_settings.height);

    let mut camera = Camera::new()
        .with_resolution(width, height)
        .with_position(Vec3::from_array(description.camera.look_from))
        .with_look_at(Vec3::from_array(description.camera.look_at))
        .with_up(Vec3::from_array(description.camera.up))
        .with_vfov(description.camera.vfov);
    camera.initialize();

    let options = AccelOptions {
        bounds: args.bounds.into(),
        use_octree: !args.no_octree,
        octree_depth: args.octree_depth,
    };

    let load_start = Instant::now();
    let mut textures = TextureCache::new();
    let mut meshes = Vec::with_capacity(description.meshes.len());
    for placement in &description.meshes {
        let mesh = RtMesh::load(
            &placement.path,
            placement.matrix(),
            options,
            &placement.fallback_material(),
            &mut textures,
        )
        .with_context(|| format!("failed to load mesh {}", placement.path))?;
        meshes.push(mesh);
    }
    info!(
        "loaded {} mesh(es) and {} texture(s) in {:.2?}",
        meshes.len(),
        textures.len(),
        load_start.elapsed()
    );

    let scene = Scene::new(meshes, textures, Vec3::from_array(render_settings.sky));
    let config = RenderConfig {
        samples_per_pixel: args.samples.unwrap_or(render_settings.samples_per_pixel),
        max_depth: args.max_depth.unwrap_or(render_settings.max_depth),
        seed: args.seed.unwrap_or(render_settings.seed),
    };

    let render_start = Instant::now();
    let image = render(&scene, &camera, &config);
    info!("rendered in {:.2?}", render_start.elapsed());

    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output))?;
    info!("wrote {}", args.output);

    Ok(())
}
