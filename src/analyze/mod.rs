pub mod diagnose;
pub mod kmeans;
pub mod segment;
pub mod tfidf;
pub mod tracks;
