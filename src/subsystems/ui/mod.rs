//! UI subsystem: server-rendered chat page.
//!
//! Unlike comms or agents, the UI subsystem does **not** run independent
//! tasks. It is a set of pure render functions the axum channel calls with a
//! session snapshot: [`page::render_page`] for the whole page and
//! [`theme::theme_css`] for the stylesheet of the selected theme.

pub mod page;
pub mod theme;

pub use page::{ErrorBanner, PageView, escape_html, render_page};
pub use theme::{Theme, load_background_image, theme_css};
