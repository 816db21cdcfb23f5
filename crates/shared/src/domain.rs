use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ClusterId);
id_newtype!(PostId);

/// Interest level a user assigns to one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    pub const DEFAULT: Rating = Rating(5);

    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::RatingOutOfRange { value })
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Rating {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-cluster ratings, keyed by cluster id.
///
/// Serializes as a JSON object with stringified ids as keys, ordered by id:
/// `{"1":8,"2":3}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingMap(BTreeMap<ClusterId, Rating>);

impl RatingMap {
    /// One default entry per cluster id; duplicates collapse.
    pub fn with_defaults(cluster_ids: impl IntoIterator<Item = ClusterId>) -> Self {
        Self(
            cluster_ids
                .into_iter()
                .map(|id| (id, Rating::DEFAULT))
                .collect(),
        )
    }

    /// Updates an existing entry and returns the previous rating.
    pub fn set(&mut self, cluster_id: ClusterId, rating: Rating) -> Result<Rating, DomainError> {
        match self.0.get_mut(&cluster_id) {
            Some(slot) => Ok(std::mem::replace(slot, rating)),
            None => Err(DomainError::UnknownCluster { cluster_id }),
        }
    }

    pub fn get(&self, cluster_id: ClusterId) -> Option<Rating> {
        self.0.get(&cluster_id).copied()
    }

    pub fn reset_to_defaults(&mut self) {
        for rating in self.0.values_mut() {
            *rating = Rating::DEFAULT;
        }
    }

    pub fn contains(&self, cluster_id: ClusterId) -> bool {
        self.0.contains_key(&cluster_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, Rating)> + '_ {
        self.0.iter().map(|(id, rating)| (*id, *rating))
    }
}

impl FromIterator<(ClusterId, Rating)> for RatingMap {
    fn from_iter<T: IntoIterator<Item = (ClusterId, Rating)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Number of clusters the backend accepts for a re-clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ClusterCount(u32);

impl ClusterCount {
    pub const MIN: u32 = 2;
    pub const MAX: u32 = 50;

    pub fn new(value: u32) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::ClusterCountOutOfRange { value })
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for ClusterCount {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClusterCount> for u32 {
    fn from(value: ClusterCount) -> Self {
        value.0
    }
}

impl std::fmt::Display for ClusterCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(value: u8) -> Rating {
        Rating::new(value).expect("valid rating")
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(10).is_ok());
        assert!(matches!(
            Rating::new(0),
            Err(DomainError::RatingOutOfRange { value: 0 })
        ));
        assert!(Rating::new(11).is_err());
    }

    #[test]
    fn defaults_cover_every_cluster_once() {
        let map = RatingMap::with_defaults([ClusterId(3), ClusterId(1), ClusterId(3)]);
        assert_eq!(map.len(), 2);
        assert!(map.iter().all(|(_, r)| r == Rating::DEFAULT));
    }

    #[test]
    fn set_touches_only_target_entry() {
        let mut map = RatingMap::with_defaults([ClusterId(1), ClusterId(2)]);
        let previous = map.set(ClusterId(2), rating(9)).expect("known cluster");
        assert_eq!(previous, Rating::DEFAULT);
        assert_eq!(map.get(ClusterId(1)), Some(Rating::DEFAULT));
        assert_eq!(map.get(ClusterId(2)), Some(rating(9)));
    }

    #[test]
    fn set_rejects_unknown_cluster() {
        let mut map = RatingMap::with_defaults([ClusterId(1)]);
        let err = map.set(ClusterId(7), rating(2)).expect_err("unknown");
        assert!(matches!(
            err,
            DomainError::UnknownCluster {
                cluster_id: ClusterId(7)
            }
        ));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut map = RatingMap::with_defaults([ClusterId(1), ClusterId(2)]);
        map.set(ClusterId(1), rating(1)).expect("set");
        map.set(ClusterId(2), rating(10)).expect("set");
        map.reset_to_defaults();
        assert!(map.iter().all(|(_, r)| r == Rating::DEFAULT));
    }

    #[test]
    fn rating_map_serializes_with_string_keys() {
        let map: RatingMap = [(ClusterId(2), rating(3)), (ClusterId(1), rating(8))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&map).expect("serialize");
        assert_eq!(json, r#"{"1":8,"2":3}"#);

        let back: RatingMap = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, map);
    }

    #[test]
    fn rating_deserialization_enforces_range() {
        assert!(serde_json::from_str::<Rating>("11").is_err());
        assert_eq!(serde_json::from_str::<Rating>("4").expect("valid"), rating(4));
    }

    #[test]
    fn cluster_count_matches_backend_range() {
        assert!(ClusterCount::new(1).is_err());
        assert_eq!(ClusterCount::new(2).expect("min").get(), 2);
        assert_eq!(ClusterCount::new(50).expect("max").get(), 50);
        assert!(ClusterCount::new(51).is_err());
    }
}
