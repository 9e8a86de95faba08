//! Category → handler routing. Pure, no I/O.

use crate::error::TurnError;
use crate::routing::category::{Category, HandlerId};

/// Route a classified category. Absent → logical handler.
pub fn route(category: Option<Category>) -> HandlerId {
    RoutingPolicy::default().route(category)
}

/// Route a raw string label.
///
/// Labels outside the category set are rejected rather than sent to the
/// default handler.
pub fn route_label(label: Option<&str>) -> Result<HandlerId, TurnError> {
    let category = label
        .map(|l| {
            l.parse::<Category>()
                .map_err(|_| TurnError::UnroutableCategory {
                    label: l.to_string(),
                })
        })
        .transpose()?;
    Ok(route(category))
}

/// Routing table with an explicit default for unclassified turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingPolicy {
    /// Category assumed when no classification is present.
    pub default_category: Category,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            default_category: Category::Logical,
        }
    }
}

impl RoutingPolicy {
    pub fn new(default_category: Category) -> Self {
        Self { default_category }
    }

    /// Total over `Option<Category>`.
    pub fn route(&self, category: Option<Category>) -> HandlerId {
        HandlerId::for_category(category.unwrap_or(self.default_category))
    }
}
