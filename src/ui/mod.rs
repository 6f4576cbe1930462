//! UI components for Slatepad

pub mod editor;
pub mod footer;
pub mod navbar;
pub mod preview;
pub mod sidebar;
