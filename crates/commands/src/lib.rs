mod action;
mod config;
mod format;
mod menu;
mod mount;
mod registry;
mod shell;
mod slash;
mod theme;
mod view;

pub use crate::action::*;
pub use crate::config::*;
pub use crate::format::*;
pub use crate::menu::*;
pub use crate::mount::*;
pub use crate::registry::*;
pub use crate::shell::*;
pub use crate::slash::*;
pub use crate::theme::*;
pub use crate::view::*;
