//! Built-in segment modules for the default timeline.
//!
//! Each module animates its own segment only. Movement is relative: a module reads the value an
//! actor carries into the segment's first frame and keys from there, so segments compose when
//! dispatched in timeline order.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::build::cast::{
    CAMERA, CART, COMPOSITOR, FILL_LIGHT, GUIDE, HERO, KEY_LIGHT, LANTERN,
};
use crate::build::segments::{SegmentModule, SegmentRegistry};
use crate::foundation::core::{FrameIndex, FrameSpan};
use crate::foundation::error::ReelResult;
use crate::scene::actor::ActorKind;
use crate::scene::state::SceneState;

/// Registry with one module per segment of the built-in timeline, in timeline order.
pub fn builtin_registry() -> ReelResult<SegmentRegistry> {
    let mut reg = SegmentRegistry::new();
    let modules: Vec<Box<dyn SegmentModule>> = vec![
        Box::new(ColdOpen),
        Box::new(TitleCard),
        Box::new(Arrival),
        Box::new(MarketWalk),
        Box::new(FirstMeeting),
        Box::new(StormGathers),
        Box::new(Shelter),
        Box::new(NightTalk),
        Box::new(Dawn),
        Box::new(Departure),
        Box::new(LongRoad),
        Box::new(Return),
        Box::new(Finale),
        Box::new(Credits),
    ];
    for module in modules {
        reg.register(module)?;
    }
    Ok(reg)
}

fn skip_without(scene: &SceneState, segment: &str, actors: &[&str]) -> bool {
    match actors.iter().find(|a| !scene.contains(a)) {
        Some(missing) => {
            tracing::debug!(segment, actor = *missing, "optional actor absent, skipping");
            true
        }
        None => false,
    }
}

fn ramp(
    scene: &mut SceneState,
    actor: &str,
    path: &str,
    index: u32,
    span: FrameSpan,
    from: f64,
    to: f64,
) -> ReelResult<()> {
    scene.keyframe(actor, path, index, FrameIndex(span.start), from)?;
    scene.keyframe(actor, path, index, FrameIndex(span.end), to)
}

/// Ramp from the carried value to `to` across `span`.
fn ramp_to(
    scene: &mut SceneState,
    actor: &str,
    path: &str,
    index: u32,
    span: FrameSpan,
    to: f64,
) -> ReelResult<()> {
    let from = scene.sample(actor, path, index, FrameIndex(span.start))?;
    ramp(scene, actor, path, index, span, from, to)
}

/// Ramp from the carried value by `delta` across `span`.
fn ramp_by(
    scene: &mut SceneState,
    actor: &str,
    path: &str,
    index: u32,
    span: FrameSpan,
    delta: f64,
) -> ReelResult<()> {
    let from = scene.sample(actor, path, index, FrameIndex(span.start))?;
    ramp(scene, actor, path, index, span, from, from + delta)
}

fn walk(scene: &mut SceneState, actor: &str, span: FrameSpan, delta: [f64; 3]) -> ReelResult<()> {
    for (axis, d) in delta.iter().enumerate() {
        ramp_by(scene, actor, "location", axis as u32, span, *d)?;
    }
    if scene.actor(actor).is_some_and(|a| a.kind == ActorKind::Character) {
        // One stride cycle per second of screen time.
        let fps = scene.settings().fps.as_f64();
        let cycles = span.len_frames() as f64 / fps;
        ramp_by(scene, actor, "pose.walk", 0, span, cycles)?;
    }
    Ok(())
}

fn turn(scene: &mut SceneState, actor: &str, span: FrameSpan, radians: f64) -> ReelResult<()> {
    ramp_by(scene, actor, "rotation_euler", 2, span, radians)
}

/// Deterministic flicker in `[0, 1)`.
fn flicker(frame: u64) -> f64 {
    let mut x = frame.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    x ^= x >> 29;
    (x % 1000) as f64 / 1000.0
}

struct ColdOpen;

impl SegmentModule for ColdOpen {
    fn segment(&self) -> &str {
        "cold_open"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        if skip_without(scene, self.segment(), &[CAMERA]) {
            return Ok(());
        }
        let span = scene.timeline().lookup("cold_open")?;
        walk(scene, CAMERA, span, [0.0, 10.0, 0.5])?;
        ramp(scene, CAMERA, "lens", 0, span, 35.0, 50.0)
    }
}

struct TitleCard;

impl SegmentModule for TitleCard {
    fn segment(&self) -> &str {
        "title_card"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        let span = scene.timeline().lookup("title_card")?;
        if !scene.contains("TitleCard") {
            let card = scene.ensure_actor("TitleCard", ActorKind::Prop)?;
            card.transform.location = [0.0, -12.0, 1.6];
            card.properties.insert("text_size".to_string(), 1.0);
        }
        scene.keyframe("TitleCard", "visible", 0, FrameIndex(span.start), 1.0)?;
        scene.keyframe("TitleCard", "visible", 0, FrameIndex(span.end), 0.0)
    }
}

struct Arrival;

impl SegmentModule for Arrival {
    fn segment(&self) -> &str {
        "arrival"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        if skip_without(scene, self.segment(), &[HERO]) {
            return Ok(());
        }
        let span = scene.timeline().lookup("arrival")?;
        walk(scene, HERO, span, [10.0, 0.0, 0.0])?;
        ramp(scene, HERO, "pose.arm_swing", 0, span, 0.0, 1.0)?;
        if scene.contains(CART) {
            walk(scene, CART, span, [10.0, 0.0, 0.0])?;
        }
        Ok(())
    }
}

struct MarketWalk;

impl SegmentModule for MarketWalk {
    fn segment(&self) -> &str {
        "market_walk"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        if skip_without(scene, self.segment(), &[HERO]) {
            return Ok(());
        }
        let span = scene.timeline().lookup("market_walk")?;
        walk(scene, HERO, span, [6.0, 2.0, 0.0])?;
        if scene.contains(GUIDE) {
            walk(scene, GUIDE, span, [2.0, 0.5, 0.0])?;
        }
        Ok(())
    }
}

struct FirstMeeting;

impl SegmentModule for FirstMeeting {
    fn segment(&self) -> &str {
        "first_meeting"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        if skip_without(scene, self.segment(), &[HERO, GUIDE]) {
            return Ok(());
        }
        let span = scene.timeline().lookup("first_meeting")?;
        if !scene.contains("MeetingSpot") {
            let x = scene.sample(HERO, "location", 0, FrameIndex(span.start))?;
            let y = scene.sample(HERO, "location", 1, FrameIndex(span.start))?;
            scene
                .ensure_actor("MeetingSpot", ActorKind::Prop)?
                .transform
                .location = [x, y, 0.0];
        }
        turn(scene, HERO, span, FRAC_PI_2)?;
        turn(scene, GUIDE, span, -FRAC_PI_2)
    }
}

struct StormGathers;

impl SegmentModule for StormGathers {
    fn segment(&self) -> &str {
        "storm_gathers"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        let span = scene.timeline().lookup("storm_gathers")?;
        if scene.contains(KEY_LIGHT) {
            ramp_to(scene, KEY_LIGHT, "energy", 0, span, 300.0)?;
        }
        if scene.contains(FILL_LIGHT) {
            ramp_to(scene, FILL_LIGHT, "color", 2, span, 0.8)?;
        }
        if scene.contains(COMPOSITOR) {
            ramp_to(scene, COMPOSITOR, "exposure", 0, span, -0.5)?;
        }
        Ok(())
    }
}

struct Shelter;

impl SegmentModule for Shelter {
    fn segment(&self) -> &str {
        "shelter"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        if skip_without(scene, self.segment(), &[HERO]) {
            return Ok(());
        }
        let span = scene.timeline().lookup("shelter")?;
        if !scene.contains("Shelter") {
            let x = scene.sample(HERO, "location", 0, FrameIndex(span.start))?;
            let y = scene.sample(HERO, "location", 1, FrameIndex(span.start))?;
            scene
                .ensure_actor("Shelter", ActorKind::Prop)?
                .transform
                .location = [x, y - 3.0, 0.0];
        }
        walk(scene, HERO, span, [0.0, -3.0, 0.0])?;
        if scene.contains(CAMERA) {
            walk(scene, CAMERA, span, [0.0, -4.0, -1.0])?;
        }
        Ok(())
    }
}

struct NightTalk;

impl SegmentModule for NightTalk {
    fn segment(&self) -> &str {
        "night_talk"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        let span = scene.timeline().lookup("night_talk")?;
        if scene.contains(KEY_LIGHT) {
            ramp_to(scene, KEY_LIGHT, "energy", 0, span, 50.0)?;
        }
        if skip_without(scene, self.segment(), &[LANTERN]) {
            return Ok(());
        }
        let mut frame = span.start;
        while frame <= span.end {
            let energy = 40.0 + 8.0 * flicker(frame);
            scene.keyframe(LANTERN, "energy", 0, FrameIndex(frame), energy)?;
            frame += 12;
        }
        Ok(())
    }
}

struct Dawn;

impl SegmentModule for Dawn {
    fn segment(&self) -> &str {
        "dawn"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        let span = scene.timeline().lookup("dawn")?;
        if scene.contains(KEY_LIGHT) {
            ramp_to(scene, KEY_LIGHT, "energy", 0, span, 1200.0)?;
        }
        if scene.contains(COMPOSITOR) {
            ramp_to(scene, COMPOSITOR, "glare", 0, span, 0.6)?;
            ramp_to(scene, COMPOSITOR, "exposure", 0, span, 0.0)?;
        }
        if scene.contains(LANTERN) {
            ramp_to(scene, LANTERN, "energy", 0, span, 0.0)?;
        }
        Ok(())
    }
}

struct Departure;

impl SegmentModule for Departure {
    fn segment(&self) -> &str {
        "departure"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        if skip_without(scene, self.segment(), &[HERO]) {
            return Ok(());
        }
        let span = scene.timeline().lookup("departure")?;
        turn(scene, HERO, span, -FRAC_PI_2)?;
        // Lean into the walk.
        ramp_by(scene, HERO, "rotation_euler", 0, span, 0.05)?;
        ramp_by(scene, HERO, "rotation_euler", 1, span, 0.0)?;
        walk(scene, HERO, span, [0.0, 8.0, 0.0])?;
        if scene.contains(GUIDE) {
            ramp(scene, GUIDE, "pose.wave", 0, span, 0.0, 1.0)?;
        }
        Ok(())
    }
}

struct LongRoad;

impl SegmentModule for LongRoad {
    fn segment(&self) -> &str {
        "long_road"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        if skip_without(scene, self.segment(), &[HERO]) {
            return Ok(());
        }
        let span = scene.timeline().lookup("long_road")?;
        walk(scene, HERO, span, [20.0, 0.0, 0.0])?;
        if !scene.contains(CAMERA) {
            return Ok(());
        }
        // Track the hero from behind.
        let mut frame = span.start;
        loop {
            let x = scene.sample(HERO, "location", 0, FrameIndex(frame))?;
            scene.keyframe(CAMERA, "location", 0, FrameIndex(frame), x - 6.0)?;
            if frame == span.end {
                break;
            }
            frame = (frame + 120).min(span.end);
        }
        Ok(())
    }
}

struct Return;

impl SegmentModule for Return {
    fn segment(&self) -> &str {
        "return"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        if skip_without(scene, self.segment(), &[HERO]) {
            return Ok(());
        }
        let span = scene.timeline().lookup("return")?;
        turn(scene, HERO, span, PI)?;
        walk(scene, HERO, span, [-20.0, 0.0, 0.0])?;
        if scene.contains(GUIDE) {
            ramp_to(scene, GUIDE, "pose.wave", 0, span, 0.0)?;
        }
        Ok(())
    }
}

struct Finale;

impl SegmentModule for Finale {
    fn segment(&self) -> &str {
        "finale"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        let span = scene.timeline().lookup("finale")?;
        if scene.contains(CAMERA) {
            walk(scene, CAMERA, span, [0.0, -6.0, 8.0])?;
            ramp_by(scene, CAMERA, "rotation_euler", 0, span, -0.3)?;
        }
        if scene.contains(COMPOSITOR) {
            ramp_to(scene, COMPOSITOR, "vignette", 0, span, 0.4)?;
        }
        Ok(())
    }
}

struct Credits;

impl SegmentModule for Credits {
    fn segment(&self) -> &str {
        "credits"
    }

    fn setup(&self, scene: &mut SceneState) -> ReelResult<()> {
        let span = scene.timeline().lookup("credits")?;
        if scene.contains(COMPOSITOR) {
            ramp(scene, COMPOSITOR, "fade", 0, span, 0.0, 1.0)?;
        }
        if scene.contains(HERO) {
            ramp(scene, HERO, "visible", 0, span, 1.0, 0.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/build/modules.rs"]
mod tests;
