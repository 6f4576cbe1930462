//! Core functionality: slash commands, note state, storage and export

pub mod autosave;
pub mod commands;
pub mod config;
pub mod editor;
pub mod export;
pub mod notes;
pub mod pdf;
pub mod storage;
pub mod structured;
pub mod text_stats;
