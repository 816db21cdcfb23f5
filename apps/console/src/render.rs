//! Plain-text views of controller state.

use client_core::{Notification, NotificationKind, ViewEvent, WizardStep};
use shared::{
    domain::{Rating, RatingMap},
    protocol::{Article, Cluster, RecommendationResult, SystemStats},
};

const SAMPLE_TITLES_PER_CARD: usize = 3;

pub fn render_event(event: &ViewEvent) -> Option<String> {
    match event {
        ViewEvent::StatsRendered(stats) => Some(render_stats(stats)),
        ViewEvent::ClustersRendered { clusters, ratings } => {
            Some(render_clusters(clusters, ratings))
        }
        ViewEvent::RatingChanged { cluster_id, rating } => {
            Some(format!("cluster {cluster_id} rated {rating}/10"))
        }
        ViewEvent::RatingsReset(ratings) if ratings.is_empty() => {
            Some("ratings reset: no clusters loaded".to_string())
        }
        ViewEvent::RatingsReset(ratings) => Some(format!(
            "ratings reset: {} clusters at {}/10",
            ratings.len(),
            Rating::DEFAULT
        )),
        ViewEvent::StepChanged(step) => Some(render_step(*step)),
        ViewEvent::ProcessingMessage(Some(message)) => Some(format!("... {message}")),
        ViewEvent::ProcessingMessage(None) => None,
        ViewEvent::RecommendationsRendered(result) => Some(render_recommendations(result)),
        ViewEvent::Notified(notification) => Some(render_notification(notification)),
        ViewEvent::ExportReady(artifact) => Some(format!("export ready: {}", artifact.file_name)),
    }
}

pub fn render_step(step: WizardStep) -> String {
    let title = match step {
        WizardStep::Rating => "Step 1/3: rate each topic cluster (rate <id> <1-10>, then generate)",
        WizardStep::Processing => "Step 2/3: analyzing your preferences...",
        WizardStep::Results => "Step 3/3: your personalized recommendations",
    };
    format!("== {title}")
}

pub fn render_stats(stats: &SystemStats) -> String {
    let mut out = format!(
        "{} blog posts | {} AI clusters | {}D embeddings | {}",
        thousands(stats.total_posts),
        stats.num_clusters,
        stats.embedding_dimensions,
        stats.embedding_model
    );
    if let Some(categories) = stats.num_categories {
        out.push_str(&format!(" | {categories} categories"));
    }
    out
}

pub fn render_clusters(clusters: &[Cluster], ratings: &RatingMap) -> String {
    if clusters.is_empty() {
        return "no clusters available".to_string();
    }
    clusters
        .iter()
        .map(|cluster| {
            let rating = ratings.get(cluster.cluster_id).unwrap_or_default();
            render_cluster_card(cluster, rating)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_cluster_card(cluster: &Cluster, rating: Rating) -> String {
    let mut out = format!(
        "Cluster {} ({} posts)\n  {}",
        cluster.cluster_id, cluster.size, cluster.summary
    );
    for post in cluster.sample_posts.iter().take(SAMPLE_TITLES_PER_CARD) {
        out.push_str(&format!("\n  • {}", post.title));
    }
    out.push_str(&format!("\n  interest: {rating}/10"));
    out
}

pub fn render_recommendations(result: &RecommendationResult) -> String {
    let stats = &result.preference_stats;
    let mut out = format!(
        "average rating: {:.1} | clusters rated: {}",
        stats.average_rating, stats.total_clusters_rated
    );
    out.push_str("\n\nMost interesting:");
    render_articles(&mut out, &result.most_interesting);
    out.push_str("\n\nLeast interesting:");
    render_articles(&mut out, &result.least_interesting);
    out
}

fn render_articles(out: &mut String, articles: &[Article]) {
    if articles.is_empty() {
        out.push_str("\n  (none)");
        return;
    }
    for (index, article) in articles.iter().enumerate() {
        let cluster = article
            .cluster_id
            .map(|id| format!("Cluster {id}"))
            .unwrap_or_else(|| "Unclustered".to_string());
        let description = article
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No description available");
        out.push_str(&format!(
            "\n  #{} {} [{}]\n     {}",
            index + 1,
            article.title,
            cluster,
            description
        ));
    }
}

pub fn render_notifications(active: &[Notification]) -> String {
    if active.is_empty() {
        return "no active notifications".to_string();
    }
    active
        .iter()
        .map(render_notification)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_notification(notification: &Notification) -> String {
    let tag = match notification.kind {
        NotificationKind::Error => "error",
        NotificationKind::Success => "ok",
    };
    format!("[{tag} #{}] {}", notification.id, notification.message)
}

fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use shared::{
        domain::{ClusterId, PostId},
        protocol::{PreferenceStats, SamplePost},
    };

    use super::*;

    fn cluster() -> Cluster {
        Cluster {
            cluster_id: ClusterId(4),
            size: 37,
            summary: "Distributed databases and consensus.".to_string(),
            sample_posts: (1..=5)
                .map(|i| SamplePost {
                    title: format!("Post {i}"),
                    description: None,
                })
                .collect(),
        }
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn stats_line_matches_header_layout() {
        let stats = SystemStats {
            total_posts: 12_500,
            num_clusters: 8,
            embedding_dimensions: 1536,
            embedding_model: "nomic".to_string(),
            posts_with_embeddings: None,
            num_categories: None,
        };
        assert_eq!(
            render_stats(&stats),
            "12,500 blog posts | 8 AI clusters | 1536D embeddings | nomic"
        );
    }

    #[test]
    fn card_shows_first_three_samples() {
        let card = render_cluster_card(&cluster(), Rating::DEFAULT);
        assert!(card.starts_with("Cluster 4 (37 posts)"));
        assert!(card.contains("• Post 3"));
        assert!(!card.contains("• Post 4"));
        assert!(card.ends_with("interest: 5/10"));
    }

    #[test]
    fn recommendations_fall_back_for_missing_descriptions() {
        let result = RecommendationResult {
            preference_stats: PreferenceStats {
                average_rating: 5.5,
                total_clusters_rated: 2,
                cluster_breakdown: Vec::new(),
            },
            most_interesting: vec![Article {
                id: PostId(1),
                title: "Raft in practice".to_string(),
                description: None,
                cluster_id: Some(ClusterId(4)),
            }],
            least_interesting: Vec::new(),
        };
        let text = render_recommendations(&result);
        assert!(text.starts_with("average rating: 5.5 | clusters rated: 2"));
        assert!(text.contains("#1 Raft in practice [Cluster 4]"));
        assert!(text.contains("No description available"));
        assert!(text.ends_with("(none)"));
    }

    #[test]
    fn notifications_are_tagged_by_kind() {
        let notification = Notification {
            id: 3,
            kind: NotificationKind::Error,
            message: "No results to export".to_string(),
            expires_at: Instant::now(),
        };
        assert_eq!(
            render_notification(&notification),
            "[error #3] No results to export"
        );
    }

    #[test]
    fn notification_list_joins_lines_or_says_none() {
        assert_eq!(render_notifications(&[]), "no active notifications");
        let toast = |id| Notification {
            id,
            kind: NotificationKind::Success,
            message: "saved".to_string(),
            expires_at: Instant::now(),
        };
        assert_eq!(
            render_notifications(&[toast(1), toast(2)]),
            "[ok #1] saved\n[ok #2] saved"
        );
    }

    #[test]
    fn reset_without_clusters_is_called_out() {
        assert_eq!(
            render_event(&ViewEvent::RatingsReset(RatingMap::default())).as_deref(),
            Some("ratings reset: no clusters loaded")
        );
    }

    #[test]
    fn cleared_processing_message_renders_nothing() {
        assert!(render_event(&ViewEvent::ProcessingMessage(None)).is_none());
        assert_eq!(
            render_event(&ViewEvent::StepChanged(WizardStep::Processing)).as_deref(),
            Some("== Step 2/3: analyzing your preferences...")
        );
    }
}
