//! Terminal UI rendering using ratatui.
//!
//! ## Submodules
//!
//! - [`table`]: The node table, or a loading indicator before the first pass
//! - [`common`]: Shared components (header, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Layout
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Header (common::render_header)         │
//! ├────────────────────────────────────────┤
//! │                                        │
//! │ Node table (table::render)             │
//! │                                        │
//! ├────────────────────────────────────────┤
//! │ Status bar (common::render_status_bar) │
//! └────────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod common;
pub mod table;
pub mod theme;

pub use theme::Theme;
