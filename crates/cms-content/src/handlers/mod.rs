//! Format handlers

pub mod front_matter;
mod json;
mod toml;
mod yaml;

pub use self::front_matter::FrontMatterHandler;
pub use self::json::JsonHandler;
pub use self::toml::TomlHandler;
pub use self::yaml::YamlHandler;
