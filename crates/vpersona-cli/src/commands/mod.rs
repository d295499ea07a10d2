pub mod generate;
pub mod naming;
pub mod settings;
