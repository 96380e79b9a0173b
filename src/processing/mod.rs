//! Text segmentation, embeddings and similarity matching

pub mod text_processor;
pub mod embeddings;
pub mod embedding_manager;
pub mod labels;
pub mod matcher;
