use glam::{Vec2, Vec3};

use super::*;
use crate::{
    bake::geometry::{GeometrySource, grids_from_surface},
    foundation::math::encode_short_normal,
    mesh::lowres::{Face, Vertex},
};

fn plane() -> LowResMesh {
    let vert = |x: f32, y: f32| Vertex {
        position: Vec3::new(x, y, 0.0),
        normal: encode_short_normal(Vec3::Z),
    };
    LowResMesh {
        vertices: vec![vert(0.0, 0.0), vert(1.0, 0.0), vert(1.0, 1.0), vert(0.0, 1.0)],
        faces: vec![Face {
            verts: vec![0, 1, 2, 3],
            uv: vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y],
            smooth: false,
            image: Some(0),
        }],
        ..LowResMesh::default()
    }
}

fn flat_grids(mesh: &LowResMesh, z: f32) -> SubdivGrids {
    grids_from_surface(mesh, 3, |_, uv| (Vec3::new(uv.x, uv.y, z), Vec3::Z))
}

fn displacement(total_levels: u32) -> BakeSettings {
    BakeSettings {
        mode: BakeMode::Displacement,
        total_levels,
        ..BakeSettings::default()
    }
}

#[test]
fn settings_parse_with_defaults() {
    let s: BakeSettings = serde_json::from_str(r#"{"mode":"displacement","margin":0}"#).unwrap();
    assert_eq!(s.mode, BakeMode::Displacement);
    assert_eq!(s.margin, 0);
    assert_eq!(s.total_levels, 0);
    assert!(!s.uses_reference_grids());
    assert!(!s.use_lores_mesh);

    let s: BakeSettings = serde_json::from_str("{}").unwrap();
    assert_eq!(s, BakeSettings::default());
}

#[test]
fn reference_levels_are_capped() {
    let mut s = displacement(3);
    s.level = 1;
    assert_eq!(s.reference_levels(), 2);
    s.total_levels = 20;
    assert_eq!(s.reference_levels(), MAX_REFERENCE_LEVELS);
    s.level = 30;
    assert_eq!(s.reference_levels(), 0);
    assert!(!s.uses_reference_grids());
}

#[test]
fn reference_grids_only_matter_for_displacement() {
    assert!(displacement(2).uses_reference_grids());

    let mut s = displacement(2);
    s.use_lores_mesh = true;
    assert!(!s.uses_reference_grids());

    s = displacement(2);
    s.mode = BakeMode::Normals;
    assert!(!s.uses_reference_grids());
}

#[test]
fn job_generates_missing_tangents_on_a_copy() {
    let mesh = plane();
    let hires = flat_grids(&mesh, 0.0);
    let job = BakeJob::new(&mesh, &hires, None, BakeSettings::default()).unwrap();
    assert!(mesh.tangents.is_none());
    assert!(job.lores().tangents.is_some());
}

#[test]
fn job_rejects_excessive_level() {
    let mesh = plane();
    let hires = flat_grids(&mesh, 0.0);
    let settings = BakeSettings {
        level: MAX_LEVEL + 1,
        total_levels: MAX_LEVEL + 2,
        ..BakeSettings::default()
    };
    assert!(matches!(
        BakeJob::new(&mesh, &hires, None, settings),
        Err(BakeError::Validation(_))
    ));
}

#[test]
fn displacement_needs_reference_grids_when_subdivided() {
    let mesh = plane();
    let hires = flat_grids(&mesh, 1.0);
    let err = BakeJob::new(&mesh, &hires, None, displacement(2)).unwrap_err();
    assert!(err.to_string().contains("reference"));

    let reference = flat_grids(&mesh, 0.25);
    let job = BakeJob::new(&mesh, &hires, Some(&reference), displacement(2)).unwrap();
    let source = job.displacement_reference();
    assert!(matches!(source, ReferenceSource::Grids(_)));
    let z = source.sample(0, Vec2::splat(0.5)).position.z;
    assert!((z - 0.25).abs() < 1e-6);
}

#[test]
fn default_displacement_measures_from_lowres() {
    let mesh = plane();
    let hires = flat_grids(&mesh, 1.0);
    let settings = BakeSettings {
        mode: BakeMode::Displacement,
        ..BakeSettings::default()
    };
    let job = BakeJob::new(&mesh, &hires, None, settings).unwrap();
    assert!(matches!(
        job.displacement_reference(),
        ReferenceSource::LowRes(_)
    ));

    let mut lores_only = displacement(2);
    lores_only.use_lores_mesh = true;
    let job = BakeJob::new(&mesh, &hires, None, lores_only).unwrap();
    assert!(matches!(
        job.displacement_reference(),
        ReferenceSource::LowRes(_)
    ));

    let job = BakeJob::new(&mesh, &hires, None, displacement(0)).unwrap();
    assert!(matches!(
        job.displacement_reference(),
        ReferenceSource::LowRes(_)
    ));
}

#[test]
fn check_images_requires_every_target() {
    let mesh = plane();
    let hires = flat_grids(&mesh, 0.0);
    let job = BakeJob::new(&mesh, &hires, None, BakeSettings::default()).unwrap();
    assert!(job.check_images(&[]).is_err());
    assert!(
        job.check_images(&[ImageBuffer::new_byte("a", 2, 2)])
            .is_ok()
    );
}

#[test]
fn job_rejects_grids_without_a_face() {
    let mut mesh = plane();
    mesh.faces.push(mesh.faces[0].clone());
    let hires = flat_grids(&plane(), 0.0);
    assert!(BakeJob::new(&mesh, &hires, None, BakeSettings::default()).is_err());
}
