use super::*;

const MINIMAL: &str = r#"{
  "mesh": {
    "vertices": [
      { "position": [0, 0, 0], "normal": [0, 0, 32767] },
      { "position": [1, 0, 0], "normal": [0, 0, 32767] },
      { "position": [0, 1, 0], "normal": [0, 0, 32767] }
    ],
    "faces": [ { "verts": [0, 1, 2], "uv": [[0, 0], [1, 0], [0, 1]], "image": 0 } ]
  },
  "hires": {
    "grid_size": 2,
    "grid_offset": [0],
    "grids": [
      { "positions": [[0,0,0],[0,0,0],[0,0,0],[0,0,0]], "normals": [[0,0,1],[0,0,1],[0,0,1],[0,0,1]] },
      { "positions": [[0,0,0],[0,0,0],[0,0,0],[0,0,0]], "normals": [[0,0,1],[0,0,1],[0,0,1],[0,0,1]] },
      { "positions": [[0,0,0],[0,0,0],[0,0,0],[0,0,0]], "normals": [[0,0,1],[0,0,1],[0,0,1],[0,0,1]] }
    ]
  },
  "images": [ { "width": 8, "height": 4 }, { "width": 2, "height": 2, "float": true, "name": "extra" } ]
}"#;

#[test]
fn minimal_file_parses_with_defaults() {
    let file = JobFile::from_json_str(MINIMAL).unwrap();
    assert_eq!(file.settings, BakeSettings::default());
    assert!(file.reference.is_none());
    assert!(!file.mesh.faces[0].smooth);
    file.job().unwrap();

    let images = file.build_images();
    assert_eq!(images.len(), 2);
    assert_eq!((images[0].width(), images[0].height()), (8, 4));
    assert!(!images[0].is_float());
    assert!(images[1].is_float());
    assert_eq!(images[0].name, "0");
    assert_eq!(images[1].name, "extra");
}

#[test]
fn missing_sections_are_serde_errors() {
    let err = JobFile::from_json_str(r#"{ "images": [] }"#).unwrap_err();
    assert!(matches!(err, BakeError::Serde(_)));
}

#[test]
fn missing_file_is_io_error() {
    let err = JobFile::load(Path::new("/definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, BakeError::Io(_)));
}

#[test]
fn demo_job_is_valid_and_survives_json() {
    let file = demo_job(DemoParams::default(), BakeSettings::default());
    assert_eq!(file.mesh.face_count(), 4);
    assert_eq!(file.hires.grid_count(), 16);
    file.job().unwrap();

    let text = file.to_json_string().unwrap();
    let back = JobFile::from_json_str(&text).unwrap();
    assert_eq!(back.mesh.faces, file.mesh.faces);
    assert_eq!(back.images, file.images);
}

#[test]
fn demo_bump_peaks_at_plane_center() {
    let params = DemoParams {
        tiles: 2,
        grid_size: 3,
        image_size: 8,
        amplitude: 0.5,
    };
    let file = demo_job(params, BakeSettings::default());
    // Face 0 spans [0, 0.5]²; corner 2 of its grid reaches the plane center.
    let center = file.hires.elem(2, 2, 2, crate::mesh::grids::GridAttr::Position);
    assert!((center - Vec3::new(0.5, 0.5, 0.5)).length() < 1e-5);
    let normal = file.hires.elem(2, 2, 2, crate::mesh::grids::GridAttr::Normal);
    assert!((normal - Vec3::Z).length() < 1e-5);
}

#[test]
fn output_file_names_stay_inside_the_directory_and_are_distinct() {
    let mut file = demo_job(DemoParams::default(), BakeSettings::default());
    let desc = |name: Option<&str>| ImageDesc {
        width: 4,
        height: 4,
        float: false,
        name: name.map(str::to_string),
    };
    file.images = vec![
        desc(Some("../../etc/passwd")),
        desc(Some("/abs/path")),
        desc(Some("albedo")),
        desc(Some("Albedo")),
        desc(Some("..")),
        desc(None),
        desc(Some("albedo")),
    ];

    let names = file.output_file_names();
    assert_eq!(
        names,
        [
            "_.._etc_passwd.png",
            "_abs_path.png",
            "albedo.png",
            "Albedo-3.png",
            "4.png",
            "5.png",
            "albedo-6.png",
        ]
    );
    for name in &names {
        let path = Path::new(name);
        assert_eq!(path.components().count(), 1, "{name}");
        assert!(!name.starts_with('.'));
    }
}
