/// Screen-space overlay placement for one tracked face.
#[derive(Clone, Debug, PartialEq)]
pub struct SmoothedPose {
    pub id: u64,
    pub slot: u32,
    /// Display-rectangle pixels.
    pub x: f64,
    pub y: f64,
    /// Degrees, already sign-flipped for the mirrored display.
    pub rotation: f64,
    /// Overlay diameter in pixels.
    pub size: f64,
}

impl SmoothedPose {
    pub fn mask_asset(&self) -> String {
        mask_asset_name(self.slot)
    }
}

/// Default decoration resource for a slot.
pub fn mask_asset_name(slot: u32) -> String {
    format!("mask{slot}.png")
}
