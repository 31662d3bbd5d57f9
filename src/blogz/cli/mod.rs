mod commands;
mod menu;
mod render;
mod setup;
mod styles;
mod templates;

pub use commands::run;
