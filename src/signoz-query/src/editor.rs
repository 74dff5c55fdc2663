//! Edits made by the query editor.
//!
//! Every edit takes the current query by reference and returns the next one;
//! the previous value is never modified.

use signoz_api::{AggregateOperator, DataSource, PanelType, QueryType};

use crate::model::{AttributeKey, Filter, QueryModel};

impl QueryModel {
    /// Appends an empty filter row.
    pub fn with_filter_added(&self) -> Self {
        let mut next = self.clone();
        next.filters.push(Filter::default());
        next
    }

    pub fn with_filter_updated(&self, index: usize, filter: Filter) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.filters.get_mut(index) {
            *slot = filter;
        }
        next
    }

    pub fn with_filter_removed(&self, index: usize) -> Self {
        let mut next = self.clone();
        if index < next.filters.len() {
            next.filters.remove(index);
        }
        next
    }

    /// Adds a group-by key unless it is empty or already present.
    pub fn with_group_by_added(&self, key: &str) -> Self {
        let mut next = self.clone();
        if !key.is_empty() && !next.group_by.iter().any(|attr| attr.key == key) {
            next.group_by.push(AttributeKey::new(key));
        }
        next
    }

    pub fn with_group_by_removed(&self, index: usize) -> Self {
        let mut next = self.clone();
        if index < next.group_by.len() {
            next.group_by.remove(index);
        }
        next
    }

    pub fn with_data_source(&self, data_source: DataSource) -> Self {
        Self {
            data_source: Some(data_source.to_string()),
            ..self.clone()
        }
    }

    pub fn with_query_type(&self, query_type: QueryType) -> Self {
        Self {
            query_type: Some(query_type.to_string()),
            ..self.clone()
        }
    }

    pub fn with_panel_type(&self, panel_type: PanelType) -> Self {
        Self {
            panel_type: Some(panel_type.to_string()),
            ..self.clone()
        }
    }

    pub fn with_aggregate_operator(&self, operator: AggregateOperator) -> Self {
        Self {
            aggregate_operator: Some(operator.to_string()),
            ..self.clone()
        }
    }

    pub fn with_aggregate_attribute(&self, key: &str) -> Self {
        Self {
            aggregate_attribute: Some(AttributeKey::new(key)),
            ..self.clone()
        }
    }

    /// `0` clears the limit.
    pub fn with_limit(&self, limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..self.clone()
        }
    }
}
