//! Chunked rendering through an external host application.
//!
//! Frame ranges are split into chunks of at most [`chunk::MAX_CHUNK_FRAMES`] frames; every chunk
//! runs as its own host process writing into its own output directory.

/// Bounded render chunks and range subdivision.
pub mod chunk;
/// Host subprocess contract and build-script arguments.
pub mod host;
/// Sequential and pooled chunk dispatch.
pub mod scheduler;
