use crate::shared::display_geometry::DisplayGeometry;
use crate::shared::point::Point;

/// Scale and symmetric crop that make the source frame fill the display
/// rectangle, cropping whichever dimension overflows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub rendered_width: f64,
    pub rendered_height: f64,
}

impl CoverFit {
    /// `None` when the geometry has a non-positive or non-finite dimension.
    pub fn new(geometry: &DisplayGeometry) -> Option<Self> {
        if !geometry.is_valid() {
            return None;
        }
        let source_aspect = geometry.video_width / geometry.video_height;
        let target_aspect = geometry.display_width / geometry.display_height;

        let scale = if source_aspect > target_aspect {
            // Source is wider: height fills, sides are cropped.
            geometry.display_height / geometry.video_height
        } else {
            geometry.display_width / geometry.video_width
        };

        let rendered_width = geometry.video_width * scale;
        let rendered_height = geometry.video_height * scale;
        Some(Self {
            scale,
            offset_x: (rendered_width - geometry.display_width) / 2.0,
            offset_y: (rendered_height - geometry.display_height) / 2.0,
            rendered_width,
            rendered_height,
        })
    }

    /// Normalized source coordinates to display-rectangle pixels.
    pub fn project(&self, point: &Point) -> (f64, f64) {
        (
            point.x * self.rendered_width - self.offset_x,
            point.y * self.rendered_height - self.offset_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_narrower_source_crops_top_and_bottom() {
        let fit = CoverFit::new(&DisplayGeometry::new(1280.0, 720.0, 640.0, 480.0)).unwrap();
        assert_relative_eq!(fit.scale, 2.0);
        assert_relative_eq!(fit.rendered_height, 960.0);
        assert_relative_eq!(fit.offset_x, 0.0);
        assert_relative_eq!(fit.offset_y, 120.0);

        let (x, y) = fit.project(&Point::new(0.25, 0.25));
        assert_relative_eq!(x, 320.0);
        assert_relative_eq!(y, 120.0);
    }

    #[test]
    fn test_wider_source_crops_sides() {
        let fit = CoverFit::new(&DisplayGeometry::new(400.0, 400.0, 1920.0, 1080.0)).unwrap();
        let scale = 400.0 / 1080.0;
        assert_relative_eq!(fit.scale, scale);
        assert_relative_eq!(fit.rendered_height, 400.0, epsilon = 1e-9);
        assert_relative_eq!(fit.offset_x, (1920.0 * scale - 400.0) / 2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.offset_y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_center_maps_to_display_center() {
        for geometry in [
            DisplayGeometry::new(1280.0, 720.0, 640.0, 480.0),
            DisplayGeometry::new(400.0, 900.0, 1920.0, 1080.0),
            DisplayGeometry::new(800.0, 600.0, 800.0, 600.0),
        ] {
            let fit = CoverFit::new(&geometry).unwrap();
            let (x, y) = fit.project(&Point::new(0.5, 0.5));
            assert_relative_eq!(x, geometry.display_width / 2.0, epsilon = 1e-9);
            assert_relative_eq!(y, geometry.display_height / 2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_matching_aspect_has_no_crop() {
        let fit = CoverFit::new(&DisplayGeometry::new(1280.0, 960.0, 640.0, 480.0)).unwrap();
        assert_relative_eq!(fit.offset_x, 0.0);
        assert_relative_eq!(fit.offset_y, 0.0);
        let (x, y) = fit.project(&Point::new(1.0, 1.0));
        assert_relative_eq!(x, 1280.0);
        assert_relative_eq!(y, 960.0);
    }

    #[test]
    fn test_degenerate_geometry() {
        assert!(CoverFit::new(&DisplayGeometry::new(0.0, 720.0, 640.0, 480.0)).is_none());
        assert!(CoverFit::new(&DisplayGeometry::new(1280.0, 720.0, 640.0, 0.0)).is_none());
    }
}
