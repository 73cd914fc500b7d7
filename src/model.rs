use crate::{
    core::{Point, Rgba8},
    error::{BackdropError, BackdropResult},
};

/// Upper bound on spots per palette. The effect is meant to stay cheap; a
/// handful of full-surface gradient fills per frame is the intended load.
pub const MAX_SPOTS: usize = 8;

/// One animated radial light source.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GradientSpot {
    /// Normalized center, both coordinates in [0,1] of the viewport.
    pub center: Point,
    /// Normalized radius in (0,1], scaled by the longer viewport side at draw
    /// time.
    pub radius_factor: f64,
    /// Inner gradient stop. The outer stop is always fully transparent.
    pub color: Rgba8,
}

impl GradientSpot {
    pub fn new(center: Point, radius_factor: f64, color: Rgba8) -> Self {
        Self {
            center,
            radius_factor,
            color,
        }
    }

    pub fn validate(&self) -> BackdropResult<()> {
        if !self.center.x.is_finite() || !(0.0..=1.0).contains(&self.center.x) {
            return Err(BackdropError::validation(
                "spot center.x must be in [0, 1]",
            ));
        }
        if !self.center.y.is_finite() || !(0.0..=1.0).contains(&self.center.y) {
            return Err(BackdropError::validation(
                "spot center.y must be in [0, 1]",
            ));
        }
        if !self.radius_factor.is_finite()
            || self.radius_factor <= 0.0
            || self.radius_factor > 1.0
        {
            return Err(BackdropError::validation(
                "spot radius_factor must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// A fixed set of spots plus the seed their motion derives from.
///
/// The set is decided at construction; nothing adds or removes spots over a
/// backdrop's lifetime.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Palette {
    #[serde(default)]
    pub seed: u64,
    pub spots: Vec<GradientSpot>,
}

impl Palette {
    /// Teal, copper gold and warm sand: the three-spot dusk palette.
    pub fn dusk() -> Self {
        Self {
            seed: 1,
            spots: vec![
                GradientSpot::new(Point::new(0.2, 0.3), 0.40, Rgba8::new(17, 100, 102, 38)),
                GradientSpot::new(Point::new(0.7, 0.6), 0.35, Rgba8::new(217, 176, 140, 31)),
                GradientSpot::new(Point::new(0.5, 0.8), 0.30, Rgba8::new(255, 203, 169, 20)),
            ],
        }
    }

    /// [`Palette::dusk`] plus a pale silver fourth spot.
    pub fn dusk_silver() -> Self {
        let mut palette = Self::dusk();
        palette.spots.push(GradientSpot::new(
            Point::new(0.35, 0.15),
            0.25,
            Rgba8::new(208, 214, 224, 15),
        ));
        palette
    }

    pub fn validate(&self) -> BackdropResult<()> {
        if self.spots.is_empty() {
            return Err(BackdropError::validation(
                "palette must have at least one spot",
            ));
        }
        if self.spots.len() > MAX_SPOTS {
            return Err(BackdropError::validation(format!(
                "palette must have at most {MAX_SPOTS} spots"
            )));
        }
        for spot in &self.spots {
            spot.validate()?;
        }
        Ok(())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::dusk()
    }
}
