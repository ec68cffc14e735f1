//! Configuration module for Kapitel.
//!
//! Handles loading and managing application settings and the podcast
//! registry.

mod settings;

pub use settings::{
    EmbeddingSettings, GeneralSettings, IndexSettings, QaSettings, Settings,
};
