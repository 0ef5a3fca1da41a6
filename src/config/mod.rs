mod settings;

pub use settings::{InputConfig, LogConfig, LogFormat, PayloadConfig, Settings};
