use itertools::Itertools as _;

use scenepack::{
    Bvh, Camera, LightKind, Model, Scene, SceneBuffer, Settings,
    geometry::{ScreenSize, WorldPoint, WorldVector},
};

fn main() -> anyhow::Result<()> {
    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        anyhow::bail!("usage: scenepack-cli <model.obj>...");
    }

    let mut scene = Scene::new();
    for path in &paths {
        scene.add_model(Model::with_obj(path)?);
    }
    scene.add_light(LightKind::Directional);

    let settings = Settings::default();
    let camera = Camera::builder()
        .position(WorldPoint::new(0.0, 0.0, 5.0))
        .front(WorldVector::new(0.0, 0.0, -1.0))
        .up(WorldVector::new(0.0, 1.0, 0.0))
        .resolution(ScreenSize::new(1920, 1080))
        .fov(45.0)
        .build();

    println!(
        "Models: {}",
        scene.models().iter().map(|m| m.name()).join(", ")
    );
    println!("Triangles: {}", scene.triangle_count());
    println!("Vertices: {}", scene.vertex_count());

    let bvh = Bvh::build(scene.triangles().to_vec(), settings.max_depth);
    bvh.print_statistics();

    let mut buffer = SceneBuffer::new();
    buffer.encode_all(&scene, &camera, &settings)?;
    println!(
        "Encoded: {} floats ({} bytes)",
        buffer.len(),
        buffer.as_bytes().len()
    );

    Ok(())
}
