use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_manifest").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, w: u32, h: u32, px: [u8; 4]) {
    image::RgbaImage::from_pixel(w, h, image::Rgba(px))
        .save(path)
        .unwrap();
}

#[test]
fn records_without_kind_are_classified() {
    let json = r#"{
        "width": 8, "height": 8,
        "records": [
            { "name": "Folder", "flags": { "pixel_data_irrelevant": true } },
            { "name": "Paint", "bounds": [0, 0, 2, 2] },
            { "name": "</Layer group>" },
            { "name": "Vector", "bounds": [1, 1, 3, 3], "flags": { "pixel_data_irrelevant": true } }
        ]
    }"#;
    let manifest = LayerManifest::from_reader(json.as_bytes()).unwrap();
    assert_eq!(manifest.bit_depth, 8);
    let (info, records) = manifest.resolve(Path::new(".")).unwrap();
    assert_eq!(info.color_mode, ColorMode::Rgb);
    let kinds: Vec<RecordKind> = records.iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        [
            RecordKind::GroupOpen,
            RecordKind::Pixels,
            RecordKind::GroupClose,
            RecordKind::NonPixelShape
        ]
    );
    assert_eq!(records[1].opacity, 255);
}

#[test]
fn unknown_fields_are_rejected() {
    let json = r#"{ "width": 1, "height": 1, "records": [], "layers": [] }"#;
    let err = LayerManifest::from_reader(json.as_bytes()).unwrap_err();
    assert!(matches!(err, LayerstackError::Serde(_)), "{err}");
}

#[test]
fn load_manifest_decodes_images_relative_to_manifest() {
    let dir = scratch("load");
    write_png(&dir.join("sky.png"), 4, 2, [0, 0, 255, 255]);
    std::fs::write(
        dir.join("doc.json"),
        r#"{
            "width": 4, "height": 4, "color_mode": "Grayscale",
            "records": [
                { "name": "Sky", "image": "sky.png" },
                { "name": "Dot", "kind": "pixels", "bounds": [3, 3, 4, 4] }
            ]
        }"#,
    )
    .unwrap();

    let mut ticks = 0;
    let (doc, report) =
        load_manifest(&dir.join("doc.json"), LoadOptions::default(), &mut |_| ticks += 1)
            .unwrap();
    assert_eq!(ticks, 2);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(doc.num_layers(), 2);
    assert_eq!(doc.leaf_bounds()[0], crate::foundation::core::IRect::new(0, 0, 4, 2));
    assert_eq!(doc.merged().pixel(1, 1), [0, 0, 255, 255]);
    assert_eq!(doc.merged().pixel(1, 3), [0, 0, 0, 0]);
}

#[test]
fn embedded_profile_is_read_from_disk() {
    let dir = scratch("icc");
    std::fs::write(dir.join("gray.icc"), [1u8, 2, 3]).unwrap();
    let json = r#"{ "width": 2, "height": 2, "color_mode": "grayscale",
                    "icc_profile": "gray.icc", "records": [] }"#;
    let (info, _) = LayerManifest::from_reader(json.as_bytes())
        .unwrap()
        .resolve(&dir)
        .unwrap();
    assert_eq!(info.icc_profile, Some(IccProfile(vec![1, 2, 3])));
}

#[test]
fn missing_manifest_keeps_io_cause() {
    let err = LayerManifest::from_path("target/unit_manifest/does-not-exist.json").unwrap_err();
    let LayerstackError::Other(inner) = err else {
        panic!("expected wrapped io error");
    };
    assert!(inner.downcast_ref::<std::io::Error>().is_some());
}

#[test]
fn shape_records_carry_their_image() {
    let dir = scratch("shape");
    write_png(&dir.join("star.png"), 2, 2, [255, 0, 0, 255]);
    let json = r#"{ "width": 4, "height": 4, "records": [
        { "name": "Star", "kind": "non_pixel_shape", "bounds": [1, 1, 3, 3], "image": "star.png" }
    ] }"#;
    let (_, records) = LayerManifest::from_reader(json.as_bytes())
        .unwrap()
        .resolve(&dir)
        .unwrap();
    let image = records[0].image.as_ref().expect("shape image decoded");
    assert_eq!(image.pixel(0, 0), [255, 0, 0, 255]);
}

#[test]
fn flat_load_ignores_groups() {
    let dir = scratch("flat");
    std::fs::write(
        dir.join("doc.json"),
        r#"{ "width": 2, "height": 2, "records": [
            { "name": "G", "kind": "group_open" },
            { "name": "A", "bounds": [0, 0, 1, 1] },
            { "name": "</Layer group>" }
        ] }"#,
    )
    .unwrap();
    let (doc, _) = load_manifest(
        &dir.join("doc.json"),
        LoadOptions { load_groups: false },
        &mut |_| {},
    )
    .unwrap();
    let tree = doc.tree();
    assert_eq!(tree.children(tree.root()).len(), 1);
    assert_eq!(doc.leaf_name(0), Some("A"));
}
