//! Rendering of change reports for delivery
//!
//! - [`embed`]: rich embed model and its limits
//! - [`component`]: link buttons and action rows
//! - [`report_embed`]: report to embed conversion and section splitting

pub mod component;
pub mod embed;
pub mod report_embed;

pub use component::{Button, ButtonStyle, Component};
pub use embed::{Embed, EmbedBuilder, Field};
pub use report_embed::{render_report, split_section, RenderOptions, SplitField};
