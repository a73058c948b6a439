use super::*;

#[test]
fn new_images_are_transparent_black() {
    let img = ImageBuffer::new_float("f", 3, 2);
    assert_eq!(img.texel(5), Vec4::ZERO);
    assert!(img.alpha_is_zero(0));
    assert!(img.has_transparency());

    let img = ImageBuffer::new_byte("b", 3, 2);
    assert_eq!(img.to_rgba8(), vec![0u8; 24]);
    assert!(!img.is_empty());
    assert!(ImageBuffer::new_byte("e", 0, 4).is_empty());
}

#[test]
fn write_rgb_converts_for_byte_images() {
    let mut img = ImageBuffer::new_byte("b", 2, 1);
    img.write_rgb(1, Vec3::new(0.0, 0.5, 1.0));
    img.set_opaque(1);
    assert_eq!(&img.to_rgba8()[4..], &[0, 128, 255, 255]);
}

#[test]
fn float_images_keep_exact_values() {
    let mut img = ImageBuffer::new_float("f", 1, 1);
    img.write_rgb(0, Vec3::new(0.25, -1.0, 2.0));
    img.set_opaque(0);
    assert_eq!(img.texel(0), Vec4::new(0.25, -1.0, 2.0, 1.0));
    assert_eq!(img.to_rgba8(), vec![64, 0, 255, 255]);
}

#[test]
fn fill_alpha_makes_image_opaque() {
    let mut img = ImageBuffer::new_byte("b", 2, 2);
    img.fill_alpha_opaque();
    assert!(!img.has_transparency());
}

#[test]
fn mipmap_chain_reaches_one_texel_and_can_be_freed() {
    let mut img = ImageBuffer::new_float("f", 4, 2);
    img.fill_alpha_opaque();
    img.build_mipmaps();
    assert_eq!(img.mipmap_count(), 2);
    assert!(img.free_mipmaps());
    assert!(!img.free_mipmaps());
}
