use crate::foundation::core::{FrameIndex, FrameSpan};

/// One keyframe on a [`Curve`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurvePoint {
    /// Timeline frame of the key.
    pub frame: FrameIndex,
    /// Keyed value.
    pub value: f64,
}

/// An animation curve bound to one property path and component index.
///
/// Points are kept strictly increasing by frame; inserting at an existing frame overwrites the
/// value. The owning actor is implied by where the curve is stored (see [`crate::Action`]).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "CurveDef")]
pub struct Curve {
    data_path: String,
    array_index: u32,
    points: Vec<CurvePoint>,
}

#[derive(serde::Deserialize)]
struct CurveDef {
    data_path: String,
    #[serde(default)]
    array_index: u32,
    #[serde(default)]
    points: Vec<CurvePoint>,
}

impl From<CurveDef> for Curve {
    fn from(def: CurveDef) -> Self {
        let mut curve = Curve::new(def.data_path, def.array_index);
        for p in def.points {
            curve.insert(p.frame, p.value);
        }
        curve
    }
}

impl Curve {
    /// Create an empty curve.
    pub fn new(data_path: impl Into<String>, array_index: u32) -> Self {
        Self {
            data_path: data_path.into(),
            array_index,
            points: Vec::new(),
        }
    }

    /// Property path, e.g. `rotation_euler`.
    pub fn data_path(&self) -> &str {
        &self.data_path
    }

    /// Component index within the property.
    pub fn array_index(&self) -> u32 {
        self.array_index
    }

    /// Return `true` when this curve animates `(data_path, array_index)`.
    pub fn matches(&self, data_path: &str, array_index: u32) -> bool {
        self.array_index == array_index && self.data_path == data_path
    }

    /// Insert a key, overwriting any existing key at the same frame.
    pub fn insert(&mut self, frame: FrameIndex, value: f64) {
        match self.points.binary_search_by_key(&frame, |p| p.frame) {
            Ok(i) => self.points[i].value = value,
            Err(i) => self.points.insert(i, CurvePoint { frame, value }),
        }
    }

    /// Keys sorted by ascending frame.
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return `true` when the curve has no keys.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Frames of the first and last key.
    pub fn span(&self) -> Option<FrameSpan> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        Some(FrameSpan {
            start: first.frame.0,
            end: last.frame.0,
        })
    }

    /// Sample the curve with linear interpolation, holding the end values outside the keys.
    pub fn value_at(&self, frame: FrameIndex) -> Option<f64> {
        let first = self.points.first()?;
        let idx = self.points.partition_point(|p| p.frame <= frame);
        if idx == 0 {
            return Some(first.value);
        }
        let a = self.points[idx - 1];
        let Some(b) = self.points.get(idx) else {
            return Some(a.value);
        };
        let t = (frame.0 - a.frame.0) as f64 / (b.frame.0 - a.frame.0) as f64;
        Some(a.value + (b.value - a.value) * t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/curves/curve.rs"]
mod tests;
