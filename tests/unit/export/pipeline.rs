use super::*;
use crate::document::model::DocumentInfo;
use crate::export::encoder::InMemoryEncoder;
use crate::foundation::core::{EdgeBounds, IRect};
use crate::records::record::LayerRecord;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn solid(name: &str, bounds: IRect, px: [u8; 4]) -> LayerRecord {
    let image = Raster::solid(bounds.width as u32, bounds.height as u32, px);
    LayerRecord::pixels(
        name,
        EdgeBounds::new(bounds.y, bounds.x, bounds.bottom(), bounds.right()),
        Some(image),
    )
}

fn doc(w: u32, h: u32, records: Vec<LayerRecord>) -> Document {
    Document::load(DocumentInfo::rgb8(w, h), records, &mut |_| {})
        .unwrap()
        .0
}

#[test]
fn every_leaf_is_exported_canvas_sized_in_flattened_order() {
    let mut d = doc(
        10,
        10,
        vec![
            LayerRecord::group_open("G"),
            solid("art/A.png", IRect::new(0, 0, 4, 4), BLUE),
            LayerRecord::group_close(),
            solid("B", IRect::new(2, 2, 3, 3), RED),
        ],
    );
    let mut enc = InMemoryEncoder::new();
    let summary = export_layers(&mut d, &mut enc, &ExportOptions::default(), &mut |_| {}).unwrap();

    let names: Vec<&str> = summary.exported.iter().map(|e| e.file_name.as_str()).collect();
    assert_eq!(names, ["A.png", "B.png"]);
    assert!(summary.skipped.is_empty());

    let b = enc.get("B.png").unwrap();
    assert_eq!((b.width, b.height), (10, 10));
    assert_eq!(b.pixel(2, 2), RED);
    assert_eq!(b.pixel(4, 4), RED);
    assert_eq!(b.pixel(1, 1), [0; 4]);
    assert_eq!(b.pixel(5, 5), [0; 4]);
}

#[test]
fn negative_origin_copies_shifted_source() {
    let mut image = Raster::transparent(4, 1);
    for x in 0..4 {
        image.set_pixel(x, 0, [x as u8 * 10, 0, 0, 255]);
    }
    let record = LayerRecord::pixels("shifted", EdgeBounds::new(0, -2, 1, 2), Some(image));
    let mut d = doc(8, 4, vec![record]);
    let mut enc = InMemoryEncoder::new();
    export_layers(&mut d, &mut enc, &ExportOptions::default(), &mut |_| {}).unwrap();

    let out = enc.get("shifted.png").unwrap();
    assert_eq!(out.pixel(0, 0), [20, 0, 0, 255]);
    assert_eq!(out.pixel(1, 0), [30, 0, 0, 255]);
    assert_eq!(out.pixel(2, 0), [0; 4]);
}

#[test]
fn far_edge_clamp_drops_last_column_and_updates_layer() {
    let mut d = doc(10, 10, vec![solid("edge", IRect::new(6, 0, 4, 2), RED)]);
    let mut enc = InMemoryEncoder::new();
    export_layers(&mut d, &mut enc, &ExportOptions::default(), &mut |_| {}).unwrap();

    let out = enc.get("edge.png").unwrap();
    assert_eq!(out.pixel(8, 0), RED);
    assert_eq!(out.pixel(9, 0), [0; 4]);

    let id = d.leaves()[0];
    assert_eq!(d.tree().layer(id).unwrap().bounds, IRect::new(6, 0, 3, 2));
    assert!(d.is_stale());
}

#[test]
fn off_canvas_leaf_is_skipped_and_reported() {
    let mut d = doc(
        10,
        10,
        vec![
            solid("kept", IRect::new(0, 0, 2, 2), RED),
            solid("gone", IRect::new(20, 0, 2, 2), BLUE),
        ],
    );
    let mut enc = InMemoryEncoder::new();
    let summary = export_layers(&mut d, &mut enc, &ExportOptions::default(), &mut |_| {}).unwrap();

    assert_eq!(summary.exported.len(), 1);
    assert_eq!(enc.files().len(), 1);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].index, 1);
    assert_eq!(summary.skipped[0].name, "gone");
    assert!(summary.skipped[0].width <= 0);
}

#[test]
fn only_visible_leaves_out_occluded_layers() {
    let r = IRect::new(0, 0, 4, 4);
    let mut d = doc(8, 8, vec![solid("under", r, BLUE), solid("over", r, RED)]);
    let mut enc = InMemoryEncoder::new();
    let opts = ExportOptions { only_visible: true };
    let summary = export_layers(&mut d, &mut enc, &opts, &mut |_| {}).unwrap();
    assert_eq!(summary.occluded, vec![0]);
    assert_eq!(summary.exported.len(), 1);
    assert_eq!(summary.exported[0].name, "over");
}

#[test]
fn duplicate_names_do_not_collide() {
    let r = IRect::new(0, 0, 1, 1);
    let mut d = doc(4, 4, vec![solid("Layer", r, RED), solid("Layer", r, BLUE)]);
    let mut enc = InMemoryEncoder::new();
    export_layers(&mut d, &mut enc, &ExportOptions::default(), &mut |_| {}).unwrap();
    assert!(enc.get("Layer.png").is_some());
    assert!(enc.get("Layer_2.png").is_some());
}

#[test]
fn progress_is_monotonic_and_completes() {
    let r = IRect::new(0, 0, 1, 1);
    let mut d = doc(
        4,
        4,
        vec![
            solid("a", r, RED),
            solid("b", IRect::new(9, 9, 1, 1), RED),
            solid("c", r, RED),
        ],
    );
    let mut seen = Vec::new();
    export_layers(
        &mut d,
        &mut InMemoryEncoder::new(),
        &ExportOptions::default(),
        &mut |p| seen.push((p.current, p.total, p.percent)),
    )
    .unwrap();
    assert_eq!(seen, [(1, 3, 33), (2, 3, 66), (3, 3, 100)]);
}

#[test]
fn stale_document_is_revalidated_before_export() {
    let mut d = doc(4, 4, vec![]);
    let root = d.tree().root();
    d.tree_mut()
        .add_layer(
            root,
            "added",
            Layer::new(Raster::solid(1, 1, RED), IRect::new(0, 0, 1, 1), 1.0),
        )
        .unwrap();
    let mut enc = InMemoryEncoder::new();
    let summary = export_layers(&mut d, &mut enc, &ExportOptions::default(), &mut |_| {}).unwrap();
    assert_eq!(summary.exported.len(), 1);
    assert!(!d.is_stale());
}

#[test]
fn cut_of_empty_rects_is_transparent() {
    let layer = Layer::new(Raster::solid(2, 2, RED), IRect::new(0, 0, 2, 2), 1.0);
    let rects = ExportRects {
        src: IRect::new(0, 0, 0, 2),
        dst: IRect::new(0, 0, 0, 2),
    };
    let out = cut_layer(&layer, rects, 3, 3);
    assert!(out.data.iter().all(|&b| b == 0));
}
