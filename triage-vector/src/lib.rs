pub mod cosine;
pub mod error;
pub mod filter;
pub mod index;
pub mod persistence;
pub mod types;
