mod atomic_write;
pub mod file_header;
pub mod gradient_io;
mod persist_error;
mod save_plugin;
pub mod settings_io;
pub mod tracker_io;

pub use persist_error::PersistError;
pub use save_plugin::{
    DeleteHeatmapData, HeatmapPaths, LoadHeatmapData, PersistFailed, RenameHeatmapData,
    SaveGradients, SaveHeatmapData, SaveHeatmapSettings, SavePlugin,
};
