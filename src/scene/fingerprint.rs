use std::fmt;

use xxhash_rust::xxh3::Xxh3;

use crate::curves::resolve::get_action_curves;
use crate::foundation::error::ReelResult;
use crate::scene::state::SceneState;

const XXH3_SEED: u64 = 0x5ce4_e0b1_d2a7_9c31;

/// Stable 128-bit digest of a built scene.
///
/// Covers actor names, kinds, visibility, transforms, properties, and every curve point of each
/// actor's action as listed by [`crate::get_action_curves`], including curves bound to other
/// targets. Two builds with equal fingerprints produced the same animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BuildFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl fmt::Display for BuildFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

/// Fingerprint `state`.
pub fn fingerprint_state(state: &SceneState) -> ReelResult<BuildFingerprint> {
    let mut h = StableHasher::new();
    h.write_u64(state.actors().count() as u64);
    for actor in state.actors() {
        h.write_str(&actor.name);
        h.write_u8(actor.kind.tag());
        h.write_u8(u8::from(actor.visible));
        for v in actor
            .transform
            .location
            .iter()
            .chain(&actor.transform.rotation)
            .chain(&actor.transform.scale)
        {
            h.write_f64(*v);
        }
        h.write_u64(actor.properties.len() as u64);
        for (k, v) in &actor.properties {
            h.write_str(k);
            h.write_f64(*v);
        }

        let curves = match &actor.action {
            Some(action) => get_action_curves(action)?,
            None => Vec::new(),
        };
        h.write_u64(curves.len() as u64);
        for curve in curves {
            h.write_str(curve.data_path());
            h.write_u64(u64::from(curve.array_index()));
            h.write_u64(curve.len() as u64);
            for p in curve.points() {
                h.write_u64(p.frame.0);
                h.write_f64(p.value);
            }
        }
    }
    Ok(h.finish())
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> BuildFingerprint {
        let v = self.inner.digest128();
        BuildFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}
