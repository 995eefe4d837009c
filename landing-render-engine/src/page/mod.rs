//! The page side of the visual layer.
//!
//! Every DOM touch goes through [`PageDocument`](document::PageDocument).
//! The browser build drives the real document through `web-sys`; native
//! runs and tests drive an in-memory page.

/// Document abstraction, events and errors
pub mod document;
/// In-memory document
pub mod headless;
/// Pointer-following dot
pub mod pointer_follower;
/// One-shot scroll reveals
pub mod reveal;
/// Scroll-driven parallax, progress bar and section styling
pub mod section_effects;
/// Short-lived reveal decorations
pub mod sparkle;
/// Browser document backed by `web-sys`
#[cfg(target_arch = "wasm32")]
pub mod web_document;

pub use document::PageHost;
