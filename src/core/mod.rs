pub mod engine;
pub mod export;
pub mod kicad;
pub mod kikit;
pub mod launcher;
pub mod layout;
pub mod project;
pub mod readme;
