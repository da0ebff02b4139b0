/// Frame newtypes, spans, rates and rest transforms.
pub mod core;
/// Error taxonomy.
pub mod error;
