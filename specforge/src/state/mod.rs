//! Accumulating pipeline state.
//!
//! Each pipeline defines a closed, typed state struct together with a
//! partial-update struct whose fields are all optional. The executor threads
//! one state instance through the stage chain, folding every stage's update
//! in with [`PipelineState::merge`]. Fields are never deleted: an update
//! either overwrites a field or leaves it untouched, and a field's type is
//! fixed by the struct definition, so downstream stages can never observe a
//! reshaped value.

mod bytes;

pub use bytes::base64_bytes;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// The accumulating context threaded through one pipeline run.
///
/// `merge` is pure: it never mutates the base state or the update, which is
/// what makes checkpointed state safe to replay. There are no error
/// conditions; an update simply wins for every field it carries.
pub trait PipelineState:
    Clone + Debug + Default + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// A partial update produced by a single stage.
    type Update: Debug + Default + Send + 'static;

    /// Returns a new state containing every field of `self`, overwritten by
    /// any field present in `update`.
    #[must_use]
    fn merge(&self, update: Self::Update) -> Self;
}

/// Overwrite-if-present folding for one optional update field.
///
/// Shorthand used by the `merge` implementations: the update value wins when
/// present, otherwise the base value is kept.
#[must_use]
pub fn keep_or<T: Clone>(base: &T, update: Option<T>) -> T {
    update.unwrap_or_else(|| base.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Demo {
        title: String,
        tags: Vec<String>,
    }

    #[derive(Debug, Default)]
    struct DemoUpdate {
        title: Option<String>,
        tags: Option<Vec<String>>,
    }

    impl PipelineState for Demo {
        type Update = DemoUpdate;

        fn merge(&self, update: Self::Update) -> Self {
            Self {
                title: keep_or(&self.title, update.title),
                tags: keep_or(&self.tags, update.tags),
            }
        }
    }

    #[test]
    fn update_fields_win() {
        let base = Demo {
            title: "old".to_string(),
            tags: vec!["a".to_string()],
        };
        let merged = base.merge(DemoUpdate {
            title: Some("new".to_string()),
            tags: None,
        });

        assert_eq!(merged.title, "new");
        assert_eq!(merged.tags, vec!["a".to_string()]);
    }

    #[test]
    fn absent_fields_are_retained() {
        let base = Demo {
            title: "kept".to_string(),
            tags: vec!["x".to_string(), "y".to_string()],
        };
        let merged = base.merge(DemoUpdate::default());

        assert_eq!(merged, base);
    }

    #[test]
    fn merge_does_not_mutate_the_base() {
        let base = Demo {
            title: "base".to_string(),
            tags: Vec::new(),
        };
        let _ = base.merge(DemoUpdate {
            title: Some("other".to_string()),
            tags: Some(vec!["t".to_string()]),
        });

        assert_eq!(base.title, "base");
        assert!(base.tags.is_empty());
    }
}
