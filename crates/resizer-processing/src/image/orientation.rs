use image::{imageops, DynamicImage};

/// Rotation and flips that bring a stored image upright for a given EXIF orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationTransform {
    /// Clockwise rotation in degrees, applied first.
    pub rotate: Option<u16>,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

/// Image orientation operations (rotation and flipping)
pub struct ImageOrientation;

impl ImageOrientation {
    /// Transform for an EXIF orientation value. Unknown values are treated as upright.
    pub fn transform_for(orientation: u8) -> OrientationTransform {
        let (rotate, flip_horizontal, flip_vertical) = match orientation {
            2 => (None, true, false),       // Mirror horizontal
            3 => (Some(180), false, false), // Rotate 180
            4 => (None, false, true),       // Mirror vertical
            5 => (Some(90), true, false),   // Transpose
            6 => (Some(90), false, false),  // Rotate 90 CW
            7 => (Some(270), true, false),  // Transverse
            8 => (Some(270), false, false), // Rotate 270 CW
            _ => (None, false, false),
        };
        OrientationTransform {
            rotate,
            flip_horizontal,
            flip_vertical,
        }
    }

    /// Bring `img` upright according to `orientation` (EXIF values 1-8).
    pub fn apply(mut img: DynamicImage, orientation: u8) -> DynamicImage {
        let transform = Self::transform_for(orientation);
        if transform == Self::transform_for(1) {
            return img;
        }

        tracing::debug!(
            orientation = orientation,
            rotate = ?transform.rotate,
            flip_horizontal = transform.flip_horizontal,
            flip_vertical = transform.flip_vertical,
            "Applying EXIF orientation"
        );

        if let Some(angle) = transform.rotate {
            img = Self::rotate_by_angle(img, angle);
        }
        if transform.flip_horizontal {
            img = img.fliph();
        }
        if transform.flip_vertical {
            img = img.flipv();
        }

        img
    }

    /// Rotate image by 90, 180, or 270 degrees clockwise
    pub fn rotate_by_angle(img: DynamicImage, angle: u16) -> DynamicImage {
        match angle {
            90 => DynamicImage::ImageRgba8(imageops::rotate90(&img.to_rgba8())),
            180 => DynamicImage::ImageRgba8(imageops::rotate180(&img.to_rgba8())),
            270 => DynamicImage::ImageRgba8(imageops::rotate270(&img.to_rgba8())),
            _ => img,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    /// 3x2 image with a single red marker in the top-left corner.
    fn marked() -> DynamicImage {
        let mut img = RgbaImage::from_pixel(3, 2, BLUE);
        img.put_pixel(0, 0, RED);
        DynamicImage::ImageRgba8(img)
    }

    fn red_at(img: &DynamicImage) -> (u32, u32) {
        img.pixels()
            .find(|(_, _, p)| *p == RED)
            .map(|(x, y, _)| (x, y))
            .unwrap()
    }

    #[test]
    fn test_rotation_dimension_changes() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 2, BLUE));
        assert_eq!(ImageOrientation::rotate_by_angle(img.clone(), 90).dimensions(), (2, 4));
        assert_eq!(ImageOrientation::rotate_by_angle(img.clone(), 180).dimensions(), (4, 2));
        assert_eq!(ImageOrientation::rotate_by_angle(img.clone(), 270).dimensions(), (2, 4));
        assert_eq!(ImageOrientation::rotate_by_angle(img.clone(), 45).dimensions(), (4, 2));
    }

    #[test]
    fn test_marker_positions_for_all_orientations() {
        // Where the top-left marker of a 3x2 stored image lands once made upright.
        let expected = [
            (1, (0, 0)),
            (2, (2, 0)),
            (3, (2, 1)),
            (4, (0, 1)),
            (5, (0, 0)),
            (6, (1, 0)),
            (7, (1, 2)),
            (8, (0, 2)),
        ];
        for (orientation, position) in expected {
            let upright = ImageOrientation::apply(marked(), orientation);
            assert_eq!(red_at(&upright), position, "orientation {}", orientation);
        }
    }

    #[test]
    fn test_unknown_orientation_is_identity() {
        let img = marked();
        let out = ImageOrientation::apply(img.clone(), 0);
        assert_eq!(out.dimensions(), img.dimensions());
        assert_eq!(red_at(&out), (0, 0));
        let out = ImageOrientation::apply(img, 9);
        assert_eq!(red_at(&out), (0, 0));
    }
}
