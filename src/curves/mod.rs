//! Keyframe curves and the two action storage schemes they can live in.
//!
//! Code outside this module reads and writes curves only through [`resolve`], so it never needs
//! to know whether an action is flat or layered.

/// Action storage (flat curve list or layers of per-target bindings).
pub mod action;
/// Keyframe curves.
pub mod curve;
/// Scheme-independent curve lookup and creation.
pub mod resolve;
