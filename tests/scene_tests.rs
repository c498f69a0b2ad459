//! Scene Integration Tests
//!
//! Tests for:
//! - Node creation and hierarchy edits (add / remove / re-parent)
//! - Cycle prevention
//! - Path and name lookup
//! - Node events and bubbling
//! - Dispose and bounding boxes

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use kestrel::resources::{AudioEmitter, Geometry, Material, Mesh};
use kestrel::scene::{Light, NodeContent, NodeEvent, NodeEventKind, Scene};

// ============================================================================
// Helper
// ============================================================================

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn cube_mesh() -> Mesh {
    Mesh::new(Geometry::cuboid(Vec3::splat(2.0)), Material::standard(Vec3::ONE))
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn new_scene_has_only_root() {
    let scene = Scene::new();
    assert_eq!(scene.node_count(), 1);
    let root = scene.get_node(scene.root()).unwrap();
    assert!(root.parent().is_none());
    assert!(root.children().is_empty());
}

#[test]
fn add_appends_in_order() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    let c = scene.create_node("c");
    scene.add_to_root(a);
    scene.add(a, b);
    scene.add(a, c);

    assert_eq!(scene.get_node(a).unwrap().children(), &[b, c]);
    assert_eq!(scene.get_node(b).unwrap().parent(), Some(a));
    assert_eq!(scene.get_node(a).unwrap().parent(), Some(scene.root()));
}

#[test]
fn add_reparents_from_previous_parent() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    let child = scene.create_node("child");
    scene.add_to_root(a);
    scene.add_to_root(b);
    scene.add(a, child);

    scene.add(b, child);
    assert!(scene.get_node(a).unwrap().children().is_empty());
    assert_eq!(scene.get_node(b).unwrap().children(), &[child]);
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(b));
}

#[test]
#[should_panic(expected = "cannot add a node to itself")]
fn add_self_panics() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    scene.add(a, a);
}

#[test]
#[should_panic(expected = "cannot add a node below its own descendant")]
fn add_ancestor_below_descendant_panics() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    let c = scene.create_node("c");
    scene.add_to_root(a);
    scene.add(a, b);
    scene.add(b, c);
    scene.add(c, a);
}

#[test]
#[should_panic(expected = "cannot re-parent the scene root")]
fn add_root_below_detached_node_panics() {
    let mut scene = Scene::new();
    let root = scene.root();
    let loose = scene.create_node("loose");
    scene.add(loose, root);
}

#[test]
fn rejected_add_leaves_hierarchy_intact() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    scene.add_to_root(a);
    scene.add(a, b);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| scene.add(b, a)));
    assert!(result.is_err());
    assert_eq!(scene.get_node(a).unwrap().parent(), Some(scene.root()));
    assert_eq!(scene.get_node(b).unwrap().parent(), Some(a));
    assert!(scene.get_node(b).unwrap().children().is_empty());
}

#[test]
fn remove_only_direct_children() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    let c = scene.create_node("c");
    scene.add_to_root(a);
    scene.add(a, b);
    scene.add(b, c);

    assert!(!scene.remove(a, c));
    assert_eq!(scene.get_node(c).unwrap().parent(), Some(b));

    assert!(scene.remove(a, b));
    assert!(scene.get_node(a).unwrap().children().is_empty());
    assert!(scene.get_node(b).unwrap().parent().is_none());
    // The detached subtree stays intact.
    assert_eq!(scene.get_node(b).unwrap().children(), &[c]);
    assert!(!scene.remove(a, b));
}

#[test]
fn is_ancestor_follows_parent_chain() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    scene.add_to_root(a);
    scene.add(a, b);

    assert!(scene.is_ancestor(scene.root(), b));
    assert!(scene.is_ancestor(a, b));
    assert!(!scene.is_ancestor(b, a));
    assert!(!scene.is_ancestor(b, b));
}

#[test]
fn content_nodes_carry_their_payload() {
    let mut scene = Scene::new();
    let mesh = scene.create_mesh(cube_mesh());
    let light = scene.create_light(Light::new_point(Vec3::ONE, 2.0));
    let emitter = scene.create_emitter(AudioEmitter::new(0.5));
    let group = scene.create_node("group");

    assert!(matches!(scene.get_node(mesh).unwrap().content(), NodeContent::Mesh(_)));
    assert!(matches!(scene.get_node(light).unwrap().content(), NodeContent::Light(_)));
    assert!(matches!(scene.get_node(emitter).unwrap().content(), NodeContent::Emitter(_)));
    assert_eq!(scene.get_node(group).unwrap().content(), NodeContent::Group);

    assert!(scene.get_mesh(mesh).is_some());
    assert!(scene.get_mesh(light).is_none());
    assert!((scene.get_light(light).unwrap().intensity - 2.0).abs() < EPSILON);
    assert!(scene.get_emitter(emitter).is_some());
}

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn find_by_path_resolves_child_names() {
    let mut scene = Scene::new();
    let car = scene.create_node("car");
    let body = scene.create_node("body");
    let wheel = scene.create_node("wheel");
    scene.add_to_root(car);
    scene.add(car, body);
    scene.add(body, wheel);

    let root = scene.root();
    assert_eq!(scene.find_by_path(root, "car/body/wheel"), Some(wheel));
    assert_eq!(scene.find_by_path(root, "/car/body/"), Some(body));
    assert_eq!(scene.find_by_path(car, "body"), Some(body));
    assert_eq!(scene.find_by_path(root, ""), Some(root));
    assert_eq!(scene.find_by_path(root, "car/wheel"), None);
    assert_eq!(scene.find_by_path(root, "truck"), None);
}

#[test]
fn find_by_path_first_match_wins() {
    let mut scene = Scene::new();
    let first = scene.create_node("dup");
    let second = scene.create_node("dup");
    scene.add_to_root(first);
    scene.add_to_root(second);

    assert_eq!(scene.find_by_path(scene.root(), "dup"), Some(first));
}

#[test]
fn find_by_name_searches_depth_first() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let deep = scene.create_node("target");
    let b = scene.create_node("b");
    let shallow = scene.create_node("target");
    scene.add_to_root(a);
    scene.add(a, deep);
    scene.add_to_root(b);
    scene.add(b, shallow);

    assert_eq!(scene.find_by_name(scene.root(), "target"), Some(deep));
    assert_eq!(scene.find_by_name(b, "target"), Some(shallow));
    assert_eq!(scene.find_by_name(scene.root(), "missing"), None);
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn child_added_and_removed_reach_parent() {
    let mut scene = Scene::new();
    let parent = scene.create_node("parent");
    let child = scene.create_node("child");
    scene.add_to_root(parent);

    let log = Rc::new(RefCell::new(Vec::new()));
    for kind in [NodeEventKind::ChildAdded, NodeEventKind::ChildRemoved] {
        let log = log.clone();
        scene.subscribe(parent, kind, move |event| {
            log.borrow_mut().push(*event);
            false
        });
    }

    scene.add(parent, child);
    scene.remove(parent, child);

    assert_eq!(
        *log.borrow(),
        vec![
            NodeEvent::ChildAdded { parent, child },
            NodeEvent::ChildRemoved { parent, child },
        ]
    );
}

#[test]
fn descendant_changed_bubbles_to_root() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    scene.add_to_root(a);
    scene.add(a, b);

    let hits = Rc::new(RefCell::new(Vec::new()));
    for handle in [scene.root(), a, b] {
        let hits = hits.clone();
        scene.subscribe(handle, NodeEventKind::DescendantChanged, move |event| {
            if let NodeEvent::DescendantChanged { node, origin } = event {
                hits.borrow_mut().push((*node, *origin));
            }
            false
        });
    }

    let leaf = scene.create_node("leaf");
    scene.add(b, leaf);

    assert_eq!(*hits.borrow(), vec![(b, b), (a, b), (scene.root(), b)]);
}

#[test]
fn callback_can_stop_bubbling() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    scene.add_to_root(a);
    scene.add(a, b);

    let root_hits = Rc::new(RefCell::new(0));
    {
        let root_hits = root_hits.clone();
        scene.subscribe(scene.root(), NodeEventKind::DescendantChanged, move |_| {
            *root_hits.borrow_mut() += 1;
            false
        });
    }
    scene.subscribe(a, NodeEventKind::DescendantChanged, |_| true);

    let leaf = scene.create_node("leaf");
    scene.add(b, leaf);
    assert_eq!(*root_hits.borrow(), 0);
}

#[test]
fn unsubscribe_stops_delivery() {
    let mut scene = Scene::new();
    let parent = scene.create_node("parent");
    scene.add_to_root(parent);

    let count = Rc::new(RefCell::new(0));
    let id = {
        let count = count.clone();
        scene.subscribe(parent, NodeEventKind::ChildAdded, move |_| {
            *count.borrow_mut() += 1;
            false
        })
    };

    let first = scene.create_node("first");
    scene.add(parent, first);
    assert!(scene.unsubscribe(parent, id));
    assert!(!scene.unsubscribe(parent, id));

    let second = scene.create_node("second");
    scene.add(parent, second);
    assert_eq!(*count.borrow(), 1);
}

// ============================================================================
// Dispose
// ============================================================================

#[test]
fn dispose_frees_subtree_and_content() {
    let mut scene = Scene::new();
    let group = scene.create_node("group");
    let mesh = scene.create_mesh(cube_mesh());
    let light = scene.create_light(Light::new_ambient(Vec3::ONE, 1.0));
    scene.add_to_root(group);
    scene.add(group, mesh);
    scene.add(group, light);
    assert_eq!(scene.node_count(), 4);

    let disposed = Rc::new(RefCell::new(0));
    {
        let disposed = disposed.clone();
        scene.subscribe(mesh, NodeEventKind::Disposed, move |_| {
            *disposed.borrow_mut() += 1;
            false
        });
    }

    let released = scene.dispose(group);
    // Never uploaded, so nothing to release on the GPU side.
    assert!(released.is_empty());
    assert_eq!(*disposed.borrow(), 1);
    assert_eq!(scene.node_count(), 1);
    assert!(scene.get_node(mesh).is_none());
    assert!(scene.meshes.is_empty());
    assert!(scene.lights.is_empty());
    assert!(scene.get_node(scene.root()).unwrap().children().is_empty());
}

#[test]
#[should_panic(expected = "cannot dispose the scene root")]
fn dispose_root_panics() {
    let mut scene = Scene::new();
    let root = scene.root();
    scene.dispose(root);
}

// ============================================================================
// Bounding Box
// ============================================================================

#[test]
fn bounding_box_covers_transformed_meshes() {
    let mut scene = Scene::new();
    let group = scene.create_node("group");
    let left = scene.create_mesh(cube_mesh());
    let right = scene.create_mesh(cube_mesh());
    scene.add_to_root(group);
    scene.add(group, left);
    scene.add(group, right);
    scene.node(left).set_position(-5.0, 0.0, 0.0);
    scene.node(right).set_position(5.0, 0.0, 0.0).set_scale(2.0);
    scene.update_world_matrices();

    let bbox = scene.bounding_box(group);
    assert!(vec3_approx(bbox.min, Vec3::new(-6.0, -2.0, -2.0)));
    assert!(vec3_approx(bbox.max, Vec3::new(7.0, 2.0, 2.0)));
}

#[test]
fn bounding_box_of_empty_node_is_its_position() {
    let mut scene = Scene::new();
    let marker = scene.create_node("marker");
    scene.add_to_root(marker);
    scene.node(marker).set_position(1.0, 2.0, 3.0);
    scene.update_world_matrices();

    let bbox = scene.bounding_box(marker);
    assert!(vec3_approx(bbox.min, Vec3::new(1.0, 2.0, 3.0)));
    assert!(vec3_approx(bbox.max, Vec3::new(1.0, 2.0, 3.0)));
}
