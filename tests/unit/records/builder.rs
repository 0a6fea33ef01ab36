use super::*;
use crate::foundation::core::{EdgeBounds, IRect};
use crate::records::record::RecordFlags;

fn px(name: &str, top: i32, left: i32, bottom: i32, right: i32) -> LayerRecord {
    LayerRecord::pixels(name, EdgeBounds::new(top, left, bottom, right), None)
}

fn build(records: Vec<LayerRecord>) -> LayerstackResult<BuiltTree> {
    build_tree(records, &mut |_| {})
}

fn leaf_names(tree: &LayerTree) -> Vec<String> {
    tree.leaves()
        .into_iter()
        .map(|id| tree.name(id).to_string())
        .collect()
}

#[test]
fn group_scenario_nests_and_flattens_bottom_to_top() {
    let built = build(vec![
        LayerRecord::group_open("G"),
        px("A", 0, 0, 10, 10),
        LayerRecord::group_close(),
        px("B", 0, 0, 5, 5),
    ])
    .unwrap();
    let tree = &built.tree;

    let top = tree.children(tree.root());
    assert_eq!(top.len(), 2);
    assert_eq!(tree.name(top[0]), "G");
    assert!(tree.node(top[0]).is_group());
    assert_eq!(tree.name(top[1]), "B");
    let g_children = tree.children(top[0]);
    assert_eq!(g_children.len(), 1);
    assert_eq!(tree.name(g_children[0]), "A");
    assert_eq!(tree.parent(g_children[0]), Some(top[0]));

    assert_eq!(leaf_names(tree), ["A", "B"]);
}

#[test]
fn flattened_order_matches_leaf_record_order() {
    let built = build(vec![
        px("L0", 0, 0, 1, 1),
        LayerRecord::group_open("outer"),
        px("L1", 0, 0, 1, 1),
        LayerRecord::group_open("inner"),
        px("L2", 0, 0, 1, 1),
        LayerRecord::shape("S3", EdgeBounds::new(0, 0, 2, 2)),
        LayerRecord::group_close(),
        LayerRecord::group_open("empty"),
        LayerRecord::group_close(),
        px("L4", 0, 0, 1, 1),
        LayerRecord::group_close(),
        px("L5", 0, 0, 1, 1),
    ])
    .unwrap();
    assert_eq!(leaf_names(&built.tree), ["L0", "L1", "L2", "S3", "L4", "L5"]);
    assert_eq!(built.tree.num_layers(), 6);
}

#[test]
fn pixel_bounds_convert_from_edges() {
    let built = build(vec![px("A", 2, 3, 12, 8).with_opacity(51)]).unwrap();
    let tree = &built.tree;
    let layer = tree.layer(tree.leaves()[0]).unwrap();
    assert_eq!(layer.bounds, IRect::new(3, 2, 5, 10));
    assert!((layer.opacity - 0.2).abs() < 1e-6);
    assert_eq!((layer.image.width, layer.image.height), (5, 10));
}

#[test]
fn shape_records_without_pixels_become_transparent_leaves() {
    let built = build(vec![LayerRecord::shape("S", EdgeBounds::new(0, 0, 4, 4))]).unwrap();
    let tree = &built.tree;
    let layer = tree.layer(tree.leaves()[0]).unwrap();
    assert!(layer.shape);
    assert_eq!((layer.image.width, layer.image.height), (4, 4));
    assert!(layer.image.data.iter().all(|&b| b == 0));
}

#[test]
fn shape_records_keep_their_rendered_pixels() {
    let mut shape = LayerRecord::shape("S", EdgeBounds::new(0, 0, 2, 2));
    shape.image = Some(Raster::solid(2, 2, [255, 0, 0, 255]));
    let built = build(vec![shape]).unwrap();
    let tree = &built.tree;
    let layer = tree.layer(tree.leaves()[0]).unwrap();
    assert!(layer.shape);
    assert_eq!(layer.image.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(layer.image.pixel(1, 1), [255, 0, 0, 255]);
}

#[test]
fn transparency_protected_pixels_are_discarded() {
    let protected = px("clip", 0, 0, 4, 4).with_flags(RecordFlags {
        transparency_protected: true,
        ..RecordFlags::default()
    });
    let built = build(vec![px("base", 0, 0, 4, 4), protected]).unwrap();
    assert_eq!(leaf_names(&built.tree), ["base"]);
    assert_eq!(built.discarded, ["clip"]);
}

#[test]
fn extra_close_is_a_structure_error() {
    let err = build(vec![px("A", 0, 0, 1, 1), LayerRecord::group_close()]).unwrap_err();
    assert!(matches!(err, LayerstackError::Structure(_)), "{err}");
}

#[test]
fn missing_close_is_a_structure_error() {
    let err = build(vec![
        LayerRecord::group_open("G"),
        LayerRecord::group_open("H"),
        px("A", 0, 0, 1, 1),
        LayerRecord::group_close(),
    ])
    .unwrap_err();
    match err {
        LayerstackError::Structure(msg) => assert!(msg.contains("G"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn builder_cursor_tracks_open_groups() {
    let mut b = TreeBuilder::new();
    let root = b.cursor();
    b.push(LayerRecord::group_open("G")).unwrap();
    assert_ne!(b.cursor(), root);
    b.push(LayerRecord::group_close()).unwrap();
    assert_eq!(b.cursor(), root);
    assert!(b.push(LayerRecord::group_close()).is_err());
}

#[test]
fn progress_ticks_once_per_leaf_and_ends_at_100() {
    let mut ticks = Vec::new();
    build_tree(
        vec![
            LayerRecord::group_open("G"),
            px("A", 0, 0, 1, 1),
            px("B", 0, 0, 1, 1),
            LayerRecord::group_close(),
            px("C", 0, 0, 1, 1),
        ],
        &mut |p| ticks.push(p.percent),
    )
    .unwrap();
    assert_eq!(ticks, [33, 66, 100]);
}

#[test]
fn without_groups_every_leaf_hangs_off_the_root() {
    let built = build_tree_with(
        vec![
            LayerRecord::group_open("G"),
            px("A", 0, 0, 1, 1),
            LayerRecord::group_open("H"),
            LayerRecord::shape("S", EdgeBounds::new(0, 0, 2, 2)),
            LayerRecord::group_close(),
            LayerRecord::group_close(),
            px("B", 0, 0, 1, 1),
        ],
        LoadOptions { load_groups: false },
        &mut |_| {},
    )
    .unwrap();
    let tree = &built.tree;
    let top = tree.children(tree.root());
    assert_eq!(top.len(), 3);
    assert!(top.iter().all(|&id| tree.layer(id).is_some()));
    assert_eq!(leaf_names(tree), ["A", "S", "B"]);
}

#[test]
fn without_groups_unbalanced_brackets_are_ignored() {
    let built = build_tree_with(
        vec![LayerRecord::group_close(), px("A", 0, 0, 1, 1), LayerRecord::group_open("G")],
        LoadOptions { load_groups: false },
        &mut |_| {},
    )
    .unwrap();
    assert_eq!(leaf_names(&built.tree), ["A"]);
}

#[test]
fn default_options_load_groups() {
    assert!(LoadOptions::default().load_groups);
}
