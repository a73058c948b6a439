use glam::Vec3;

use super::*;

fn seeded(width: u32, height: u32, x: u32, y: u32) -> (ImageBuffer, TexelMask) {
    let mut img = ImageBuffer::new_float("f", width, height);
    let mut mask = TexelMask::new(width, height);
    let i = img.texel_index(x, y);
    img.write_rgb(i, Vec3::new(1.0, 0.5, 0.25));
    img.set_opaque(i);
    mask.set(x, y, TexelState::Written);
    (img, mask)
}

#[test]
fn one_pass_fills_the_cross_and_diagonals() {
    let (mut img, mut mask) = seeded(5, 5, 2, 2);
    let filled = extend_margin(&mut img, Some(&mut mask), 1);

    // 4-neighbours qualify directly; diagonals do not touch an assigned
    // 4-neighbour in the first pass.
    assert_eq!(filled, 4);
    assert_eq!(mask.count(TexelState::Margin), 4);
    assert_eq!(mask.get(2, 1), TexelState::Margin);
    assert_eq!(mask.get(1, 1), TexelState::Unset);
    let c = img.texel(img.texel_index(2, 1));
    assert_eq!(c, Vec4::new(1.0, 0.5, 0.25, 1.0));
}

#[test]
fn passes_stop_early_when_image_is_full() {
    let (mut img, mut mask) = seeded(3, 1, 0, 0);
    let filled = extend_margin(&mut img, Some(&mut mask), 10);
    assert_eq!(filled, 2);
    assert_eq!(mask.count(TexelState::Unset), 0);
}

#[test]
fn without_mask_alpha_marks_assigned_texels() {
    let (mut img, _) = seeded(3, 1, 1, 0);
    let filled = extend_margin(&mut img, None, 1);
    assert_eq!(filled, 2);
    assert!(!img.has_transparency());
}

#[test]
fn byte_images_round_weighted_average() {
    let mut img = ImageBuffer::new_byte("b", 3, 1);
    let mut mask = TexelMask::new(3, 1);
    for (x, v) in [(0u32, 0.0f32), (2, 1.0)] {
        let i = img.texel_index(x, 0);
        img.write_rgb(i, Vec3::splat(v));
        img.set_opaque(i);
        mask.set(x, 0, TexelState::Written);
    }
    extend_margin(&mut img, Some(&mut mask), 1);
    assert_eq!(&img.to_rgba8()[4..8], &[128, 128, 128, 255]);
}

#[test]
fn bake_filter_promotes_new_alpha() {
    let (mut img, mut mask) = seeded(4, 4, 0, 0);
    bake_filter(&mut img, Some(&mut mask), 1);
    assert!(img.rgba_planes);
    assert!(img.has_transparency());
}

#[test]
fn bake_filter_resets_alpha_on_opaque_rgb_images() {
    let mut img = ImageBuffer::new_float("f", 2, 1);
    img.fill_alpha_opaque();
    let mut mask = TexelMask::new(2, 1);
    mask.set(0, 0, TexelState::Written);
    let filled = bake_filter(&mut img, Some(&mut mask), 2);
    assert_eq!(filled, 1);
    assert!(!img.rgba_planes);
    assert!(!img.has_transparency());
}

#[test]
fn zero_margin_fills_nothing() {
    let (mut img, mut mask) = seeded(3, 3, 1, 1);
    assert_eq!(bake_filter(&mut img, Some(&mut mask), 0), 0);
    assert_eq!(mask.count(TexelState::Margin), 0);
}
