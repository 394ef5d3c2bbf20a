//! Example: render the Cornell box with a pool of workers.
//!
//! Run with: cargo run --release --example render_scene

use lux_core::describe::{CameraDesc, GeometryDesc, MaterialDesc, SceneDesc, Vec3Desc};
use lux_core::FileLoader;
use lux_renderer::{ImageCompositor, RenderPool, Vec3};
use std::sync::Arc;

fn cornell_box() -> SceneDesc {
    let red = MaterialDesc::lambertian_color(0.65, 0.05, 0.05);
    let white = MaterialDesc::lambertian_color(0.73, 0.73, 0.73);
    let green = MaterialDesc::lambertian_color(0.12, 0.45, 0.15);
    let light = MaterialDesc::light_color(15.0, 15.0, 15.0);

    let quad = |q: [f32; 3], u: [f32; 3], v: [f32; 3], material: MaterialDesc| GeometryDesc::Quad {
        q: Vec3Desc::new(q[0], q[1], q[2]),
        u: Vec3Desc::new(u[0], u[1], u[2]),
        v: Vec3Desc::new(v[0], v[1], v[2]),
        material,
    };

    let light_panel = quad(
        [343.0, 554.0, 332.0],
        [-130.0, 0.0, 0.0],
        [0.0, 0.0, -105.0],
        light,
    );

    let tall_box = GeometryDesc::Translate {
        object: Box::new(GeometryDesc::RotateY {
            object: Box::new(GeometryDesc::box_from_corners(
                Vec3::ZERO,
                Vec3::new(165.0, 330.0, 165.0),
                white.clone(),
            )),
            angle: 15.0,
        }),
        offset: Vec3Desc::new(265.0, 0.0, 295.0),
    };
    let short_box = GeometryDesc::Translate {
        object: Box::new(GeometryDesc::RotateY {
            object: Box::new(GeometryDesc::box_from_corners(
                Vec3::ZERO,
                Vec3::new(165.0, 165.0, 165.0),
                white.clone(),
            )),
            angle: -18.0,
        }),
        offset: Vec3Desc::new(130.0, 0.0, 65.0),
    };

    SceneDesc {
        world: GeometryDesc::List {
            objects: vec![
                quad([555.0, 0.0, 0.0], [0.0, 555.0, 0.0], [0.0, 0.0, 555.0], green),
                quad([0.0, 0.0, 0.0], [0.0, 555.0, 0.0], [0.0, 0.0, 555.0], red),
                light_panel.clone(),
                quad([0.0, 0.0, 0.0], [555.0, 0.0, 0.0], [0.0, 0.0, 555.0], white.clone()),
                quad(
                    [555.0, 555.0, 555.0],
                    [-555.0, 0.0, 0.0],
                    [0.0, 0.0, -555.0],
                    white.clone(),
                ),
                quad([0.0, 0.0, 555.0], [555.0, 0.0, 0.0], [0.0, 555.0, 0.0], white),
                tall_box,
                short_box,
            ],
        },
        camera: CameraDesc {
            aspect_ratio: 1.0,
            image_width: 400,
            samples_per_pixel: 64,
            max_depth: 50,
            background: Vec3Desc::new(0.0, 0.0, 0.0),
            vfov: 40.0,
            lookfrom: Vec3Desc::new(278.0, 278.0, -800.0),
            lookat: Vec3Desc::new(278.0, 278.0, 0.0),
            vup: Vec3Desc::new(0.0, 1.0, 0.0),
            defocus_angle: 0.0,
            focus_dist: 10.0,
        },
        lights: Some(light_panel),
    }
}

fn main() {
    env_logger::init();

    let scene = cornell_box();
    let width = scene.camera.image_width;
    let height = width; // square aspect

    let workers = std::thread::available_parallelism().map_or(4, |n| n.get());
    println!("Rendering {}x{} Cornell box on {} workers...", width, height, workers);

    let mut pool = RenderPool::new(workers, Arc::new(FileLoader::new()));

    let start = std::time::Instant::now();
    if let Err(e) = pool.build_scene(&scene) {
        eprintln!("scene build failed: {}", e);
        return;
    }
    println!("Scene distributed in {:?}", start.elapsed());

    let mut compositor = ImageCompositor::new(width, height);
    let start = std::time::Instant::now();
    match pool.render(&mut compositor) {
        Ok(progress) => {
            println!(
                "Rendered {}/{} pixels in {:?} ({} failed chunks)",
                progress.pixels_completed,
                progress.pixels_total,
                start.elapsed(),
                progress.failed_chunks
            );
        }
        Err(e) => {
            eprintln!("render failed: {}", e);
            return;
        }
    }
    pool.shutdown();

    let filename = "cornell.png";
    if let Err(e) = image::save_buffer(
        filename,
        compositor.rgba(),
        width,
        height,
        image::ColorType::Rgba8,
    ) {
        eprintln!("failed to save {}: {}", filename, e);
        return;
    }
    println!("Saved to {}", filename);
}
