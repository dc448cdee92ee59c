/// Display rectangle and intrinsic source frame dimensions, in pixels.
///
/// Supplied fresh on every frame since layout can change between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayGeometry {
    pub display_width: f64,
    pub display_height: f64,
    pub video_width: f64,
    pub video_height: f64,
}

impl DisplayGeometry {
    pub fn new(display_width: f64, display_height: f64, video_width: f64, video_height: f64) -> Self {
        Self {
            display_width,
            display_height,
            video_width,
            video_height,
        }
    }

    /// All four dimensions are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        [
            self.display_width,
            self.display_height,
            self.video_width,
            self.video_height,
        ]
        .iter()
        .all(|d| d.is_finite() && *d > 0.0)
    }
}
