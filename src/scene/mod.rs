/// Named, animatable entities.
pub mod actor;
/// Content hash of a finished build.
pub mod fingerprint;
/// Per-build context.
pub mod state;
