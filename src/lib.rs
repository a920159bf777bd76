//! Real-time alignment of a transcript stream against song lyrics, driving a
//! scroll position that never moves backward.

pub mod config;
pub mod error;
pub mod evidence;
pub mod fallback;
pub mod lyrics;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod replay;
pub mod resolver;
pub mod runtime;
pub mod scoring;
pub mod scroll;
pub mod session;
pub mod tracker;
pub mod transcript;
pub mod view;

pub use config::Config;
pub use error::{ScrollError, ScrollResult};
pub use lyrics::LineIndex;
pub use session::{InputMode, LyricsView, Session};
