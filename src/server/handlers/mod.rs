// API处理器模块

pub mod catalog;

pub use catalog::*;
