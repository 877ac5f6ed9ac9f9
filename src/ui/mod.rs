//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `render` - Layout, header and error panel
//! - `posts` - Quote list (home page)
//! - `about` - About page
//! - `modal` - Random-post overlay
//! - `status` - Sync indicator and key hints
//! - `helpers` - Shared layout helpers

mod about;
mod helpers;
mod input;
mod loop_runner;
mod modal;
mod posts;
mod render;
mod status;

pub use loop_runner::{run, Action};
