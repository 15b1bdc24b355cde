pub mod declarative;
pub mod settings;
