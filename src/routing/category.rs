//! Intent categories and the handlers they map to.

use serde::{Deserialize, Serialize};

/// Inferred intent of a user turn. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Emotional support, therapy, feelings or personal problems.
    Emotional,
    /// Facts, information, logical analysis or practical solutions.
    Logical,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Emotional, Category::Logical];

    /// Wire label, as the classifier emits it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emotional => "emotional",
            Self::Logical => "logical",
        }
    }

    /// Selection criteria shown to the classifier.
    pub fn criteria(&self) -> &'static str {
        match self {
            Self::Emotional => {
                "it asks for emotional support, therapy, deals with feelings, or personal problems"
            }
            Self::Logical => {
                "it asks for facts, information, logical analysis, or practical solutions"
            }
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a label outside [`Category::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category label '{0}'")]
pub struct UnknownCategory(pub String);

impl std::str::FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| UnknownCategory(label.to_string()))
    }
}

/// Identifier of a response handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerId {
    Emotional,
    Logical,
}

impl HandlerId {
    /// Handler that serves a category. Exhaustive, so a new category does not
    /// compile until it has a handler.
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Emotional => Self::Emotional,
            Category::Logical => Self::Logical,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Emotional => "emotional_agent",
            Self::Logical => "logical_agent",
        }
    }
}

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_back_to_categories() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn parse_is_case_and_whitespace_tolerant() {
        assert_eq!(" Emotional\n".parse::<Category>().unwrap(), Category::Emotional);
        assert_eq!("LOGICAL".parse::<Category>().unwrap(), Category::Logical);
    }

    #[test]
    fn parse_rejects_labels_outside_the_set() {
        assert_eq!(
            "angry".parse::<Category>(),
            Err(UnknownCategory("angry".to_string()))
        );
        assert!("".parse::<Category>().is_err());
        assert!("emotional, logical".parse::<Category>().is_err());
    }

    #[test]
    fn every_category_has_a_handler() {
        assert_eq!(HandlerId::for_category(Category::Emotional), HandlerId::Emotional);
        assert_eq!(HandlerId::for_category(Category::Logical), HandlerId::Logical);
    }

    #[test]
    fn category_serde_uses_wire_labels() {
        assert_eq!(
            serde_json::to_string(&Category::Emotional).unwrap(),
            "\"emotional\""
        );
        let parsed: Category = serde_json::from_str("\"logical\"").unwrap();
        assert_eq!(parsed, Category::Logical);
    }

    #[test]
    fn handler_display_names() {
        assert_eq!(HandlerId::Emotional.to_string(), "emotional_agent");
        assert_eq!(HandlerId::Logical.to_string(), "logical_agent");
    }
}
