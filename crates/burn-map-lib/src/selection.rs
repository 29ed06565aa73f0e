//! Single-feature highlight state
//!
//! Owned by the map view and passed explicitly into [`crate::PreparedFeatures::compose`].
//! Selection only changes styling; it never filters the plan.

use crate::FeatureId;

/// Which feature, if any, is highlighted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    #[default]
    Unselected,
    Selected(FeatureId),
}

impl Selection {
    /// Highlight `id`, replacing any previous selection
    ///
    /// Returns the previously selected feature.
    pub fn select(&mut self, id: FeatureId) -> Option<FeatureId> {
        let previous = self.selected();
        tracing::trace!("Selection {:?} -> {}", previous, id);
        *self = Self::Selected(id);
        previous
    }

    /// Drop any selection
    pub fn clear(&mut self) -> Option<FeatureId> {
        let previous = self.selected();
        if previous.is_some() {
            tracing::trace!("Selection {:?} cleared", previous);
        }
        *self = Self::Unselected;
        previous
    }

    #[inline]
    pub fn selected(&self) -> Option<FeatureId> {
        match self {
            Self::Unselected => None,
            Self::Selected(id) => Some(*id),
        }
    }

    #[inline]
    pub fn is_selected(&self, id: FeatureId) -> bool {
        self.selected() == Some(id)
    }
}

impl From<Option<FeatureId>> for Selection {
    fn from(id: Option<FeatureId>) -> Self {
        id.map_or(Self::Unselected, Self::Selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unselected() {
        let selection = Selection::default();
        assert_eq!(selection, Selection::Unselected);
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn test_select_replaces_previous() {
        let mut selection = Selection::default();

        assert_eq!(selection.select(1), None);
        assert!(selection.is_selected(1));

        assert_eq!(selection.select(2), Some(1));
        assert!(selection.is_selected(2));
        assert!(!selection.is_selected(1));
    }

    #[test]
    fn test_reselecting_same_feature() {
        let mut selection = Selection::Selected(3);
        assert_eq!(selection.select(3), Some(3));
        assert_eq!(selection, Selection::Selected(3));
    }

    #[test]
    fn test_clear_from_any_state() {
        let mut selection = Selection::Selected(5);
        assert_eq!(selection.clear(), Some(5));
        assert_eq!(selection, Selection::Unselected);

        assert_eq!(selection.clear(), None);
        assert_eq!(selection, Selection::Unselected);
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Selection::from(Some(4)), Selection::Selected(4));
        assert_eq!(Selection::from(None), Selection::Unselected);
    }
}
