//! Actor names and the asset manifest loaded in the first build phase.
//!
//! Names are fixed strings (no random suffixes) so repeated builds address the same actors.

use crate::foundation::core::Transform3D;

/// Principal character.
pub const HERO: &str = "Hero";
/// Optional second character; segment modules skip their work when it is not loaded.
pub const GUIDE: &str = "Guide";
/// Render camera.
pub const CAMERA: &str = "MainCamera";
/// Key light.
pub const KEY_LIGHT: &str = "KeyLight";
/// Fill light.
pub const FILL_LIGHT: &str = "FillLight";
/// Rim light.
pub const RIM_LIGHT: &str = "RimLight";
/// Handheld lantern prop; also a point light source.
pub const LANTERN: &str = "Lantern";
/// Cart prop pulled along the road.
pub const CART: &str = "Cart";
/// Post-processing graph.
pub const COMPOSITOR: &str = "Compositor";

/// One actor placement in the manifest.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Placement {
    /// Actor name.
    pub name: String,
    /// Rest location.
    pub location: [f64; 3],
}

impl Placement {
    fn new(name: &str, location: [f64; 3]) -> Self {
        Self {
            name: name.to_string(),
            location,
        }
    }

    /// Rest transform for this placement.
    pub fn transform(&self) -> Transform3D {
        Transform3D::at(self.location)
    }
}

/// Which characters and props the asset-load phase creates.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CastConfig {
    /// Characters to load; the first entry named [`HERO`] is the principal.
    pub characters: Vec<Placement>,
    /// Props to load.
    pub props: Vec<Placement>,
}

impl Default for CastConfig {
    fn default() -> Self {
        Self {
            characters: vec![
                Placement::new(HERO, [-10.0, 0.0, 0.0]),
                Placement::new(GUIDE, [4.0, 1.5, 0.0]),
            ],
            props: vec![
                Placement::new(LANTERN, [-9.6, 0.3, 1.1]),
                Placement::new(CART, [-13.0, 0.0, 0.0]),
            ],
        }
    }
}

impl CastConfig {
    /// Cast with only the principal character and no props.
    pub fn minimal() -> Self {
        Self {
            characters: vec![Placement::new(HERO, [-10.0, 0.0, 0.0])],
            props: Vec::new(),
        }
    }
}
