//! Room-layout demo: a floor and four walls, plus draggable furniture.
//!
//! Left-drag on empty space orbits the camera; left-drag on a piece of
//! furniture picks it up and slides it across the floor. Scroll to zoom.

use cgmath::{Deg, Vector3};
use parlor::gfx::geometry::{generate_box, generate_plane};
use parlor::gfx::scene::{Node, Scene};

fn main() {
    env_logger::init();

    let mut app = parlor::default();
    let scene = app.scene_mut();

    build_room(scene);

    // Furniture ships as OBJ files next to the demo; when a file is missing
    // a plain crate stands in so the drag interaction still works.
    for (path, position) in [
        ("assets/chair.obj", Vector3::new(0.0, 0.0, 0.0)),
        ("assets/cabinet.obj", Vector3::new(-5.0, 0.0, -7.0)),
    ] {
        let root = match scene.add_model(path) {
            Ok(root) => root,
            Err(err) => {
                log::warn!("{}: using a stand-in crate ({})", path, err);
                stand_in_crate(scene, path)
            }
        };
        scene.node_mut(root).unwrap().position = position;
        scene.register_draggable(root);
    }

    app.run();
}

/// Floor plane and four walls; scenery only, never registered as draggable
fn build_room(scene: &mut Scene) {
    scene.add_shape("floor", &generate_plane(20.0, 20.0));

    let walls = [
        ("wall_north", Vector3::new(0.0, 1.5, -10.0), Deg(0.0)),
        ("wall_south", Vector3::new(0.0, 1.5, 10.0), Deg(0.0)),
        ("wall_east", Vector3::new(10.0, 1.5, 0.0), Deg(90.0)),
        ("wall_west", Vector3::new(-10.0, 1.5, 0.0), Deg(90.0)),
    ];
    for (name, position, rotation) in walls {
        let id = scene.add_shape(name, &generate_box(20.0, 3.0, 0.1));
        let wall = scene.node_mut(id).unwrap();
        wall.position = position;
        wall.rotation_y = rotation;
    }
}

/// A group root with a single box child, mirroring the shape of a loaded
/// model so hits on the child still resolve to the root.
fn stand_in_crate(scene: &mut Scene, path: &str) -> parlor::NodeId {
    let root = scene.add_node(Node::new(path, Vec::new()), None);
    let body = scene.add_shape("crate_body", &generate_box(1.0, 1.0, 1.0));
    let node = scene.node_mut(body).unwrap();
    node.parent = Some(root);
    node.position = Vector3::new(0.0, 0.5, 0.0);
    root
}
