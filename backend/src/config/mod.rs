pub mod settings;

pub use settings::{AppConfig, CategoryBand, RatingSettings, ServerSettings};
