//! Unsupervised classification
//!
//! - **kmeans**: Seeded k-means++ clustering of feature vectors
//! - **clustering**: Clusters of positive sample points by LST anomaly

mod clustering;
mod kmeans;

pub use clustering::{cluster_positives, positive_observations, ClusterResult, ClusteredPoint};
pub use kmeans::{kmeans, KmeansParams, KmeansResult};
