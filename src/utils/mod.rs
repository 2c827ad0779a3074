pub mod error;
pub mod fs;
pub mod logger;
pub mod text;
pub mod validation;
