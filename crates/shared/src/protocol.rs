use serde::{Deserialize, Serialize};

use crate::domain::{ClusterCount, ClusterId, PostId, RatingMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub total_posts: u64,
    pub num_clusters: u64,
    pub embedding_dimensions: u64,
    pub embedding_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts_with_embeddings: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_categories: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePost {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_id: ClusterId,
    pub size: u64,
    pub summary: String,
    #[serde(default)]
    pub sample_posts: Vec<SamplePost>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclusterRequest {
    pub num_clusters: ClusterCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSize {
    pub cluster_id: ClusterId,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclusterOutcome {
    #[serde(default)]
    pub success: bool,
    pub num_clusters: u32,
    #[serde(default)]
    pub cluster_sizes: Vec<ClusterSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummariesOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub summaries_generated: u32,
    #[serde(default)]
    pub total_clusters: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub ratings: RatingMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRating {
    pub cluster_id: ClusterId,
    pub summary: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceStats {
    pub average_rating: f64,
    pub total_clusters_rated: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cluster_breakdown: Vec<ClusterRating>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: PostId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<ClusterId>,
}

/// Ranked articles for one submitted rating map. Sent back verbatim to the
/// export endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub preference_stats: PreferenceStats,
    #[serde(default)]
    pub most_interesting: Vec<Article>,
    #[serde(default)]
    pub least_interesting: Vec<Article>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rating;

    #[test]
    fn recommendation_request_wraps_ratings() {
        let ratings: RatingMap = [
            (ClusterId(1), Rating::new(8).expect("rating")),
            (ClusterId(2), Rating::new(3).expect("rating")),
        ]
        .into_iter()
        .collect();
        let body = serde_json::to_value(RecommendationRequest { ratings }).expect("serialize");
        assert_eq!(body, serde_json::json!({ "ratings": { "1": 8, "2": 3 } }));
    }

    #[test]
    fn cluster_tolerates_missing_descriptions() {
        let cluster: Cluster = serde_json::from_value(serde_json::json!({
            "cluster_id": 4,
            "size": 12,
            "summary": "Rust async runtimes",
            "sample_posts": [
                { "title": "Tokio internals", "description": null },
                { "title": "Pinning explained" }
            ]
        }))
        .expect("cluster");
        assert_eq!(cluster.cluster_id, ClusterId(4));
        assert_eq!(cluster.sample_posts.len(), 2);
        assert!(cluster.sample_posts.iter().all(|p| p.description.is_none()));
    }

    #[test]
    fn stats_accept_extended_counters() {
        let stats: SystemStats = serde_json::from_value(serde_json::json!({
            "total_posts": 1200,
            "posts_with_embeddings": 1180,
            "num_clusters": 8,
            "num_categories": 14,
            "embedding_dimensions": 1536,
            "embedding_model": "text-embedding-nomic-embed-text-v2"
        }))
        .expect("stats");
        assert_eq!(stats.posts_with_embeddings, Some(1180));
        assert_eq!(stats.num_categories, Some(14));
    }

    #[test]
    fn recluster_request_rejects_out_of_range_counts() {
        let err = serde_json::from_value::<ReclusterRequest>(serde_json::json!({
            "num_clusters": 1
        }));
        assert!(err.is_err());
    }
}
