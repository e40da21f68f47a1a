//! Projects a graticule and a couple of synthetic features through the
//! Robinson projection and prints what came out.
//!
//! Run with `cargo run --example project_world`.

use flexproj::path::Path;
use flexproj::project::{distortion_at, FeatureProjector, Graticule};
use flexproj::scene::symbol::VectorSymbol;
use flexproj::scene::{GeoObject, GeoObjectKind, GeoPath};
use flexproj_types::geo::impls::projection::Robinson;
use flexproj_types::geo::MapProjection;

fn main() {
    env_logger::init();

    let projection = Robinson::new(10.0);
    let projector = FeatureProjector::new(&projection);

    // The graticule, every 15 degrees.
    let graticule = Graticule::default().build(&projection.bounds());

    // A ring straddling the antimeridian seam of this central meridian.
    let mut ring = Path::new();
    ring.move_to(-175.0, -10.0);
    ring.line_to(-165.0, -10.0);
    ring.line_to(-165.0, 10.0);
    ring.line_to(-175.0, 10.0);
    ring.close();

    let mut scene = GeoObject::new_set(Default::default()).with_name("world");
    scene.add_child(graticule);
    scene.add_child(
        GeoObject::new_path(GeoPath::new(ring, VectorSymbol::default())).with_name("island"),
    );

    let projected = projector.project_set(&scene);
    print_tree(&projected, 0);

    if let Some(factors) = distortion_at(&projection, 10.0, 45.0) {
        println!(
            "distortion at (10E, 45N): h={:.4} k={:.4} s={:.4} 2w={:.4}",
            factors.meridian_scale,
            factors.parallel_scale,
            factors.areal_scale,
            factors.max_angular_deformation,
        );
    }
}

fn print_tree(object: &GeoObject, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = object.name().unwrap_or("<unnamed>");
    match object.kind() {
        GeoObjectKind::Set(set) => {
            println!("{indent}{name}: set of {}", set.child_count());
            for child in object.children() {
                print_tree(child, depth + 1);
            }
        }
        GeoObjectKind::Path(path) => {
            let bounds = path
                .path()
                .bounds()
                .map(|b| format!("{:.0}x{:.0}", b.width(), b.height()))
                .unwrap_or_else(|| "empty".into());
            println!(
                "{indent}{name}: path, {} instructions, bounds {bounds}",
                path.path().instruction_count()
            );
        }
        _ => println!("{indent}{name}"),
    }
}
