//! List catalogue loading and management

use crate::core::adapter::ListConfig;
use crate::core::error::ConfigError;
use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default ordering of a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfig {
    /// Column to order by
    pub column: String,

    /// Ascending when true
    #[serde(default = "default_ascending")]
    pub ascending: bool,
}

fn default_ascending() -> bool {
    true
}

fn default_select() -> String {
    "*".to_string()
}

/// Configuration for one list page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDefinition {
    /// Name the list is served under (e.g., "vehicles")
    pub name: String,

    /// Collection queried for this list
    pub collection: String,

    /// Projection forwarded to the store
    #[serde(default = "default_select")]
    pub select: String,

    /// Ordering applied to every page
    #[serde(default)]
    pub default_order: Option<OrderConfig>,

    /// Columns searched with a single free-text term
    #[serde(default)]
    pub search_fields: Vec<String>,

    /// UI filter key -> column
    #[serde(default)]
    pub filter_map: IndexMap<String, String>,

    /// Column holding the owner id; rows are scoped to the caller when set
    #[serde(default)]
    pub scope_by_user_field: Option<String>,
}

impl ListDefinition {
    /// Validate into a [`ListConfig`]
    pub fn to_list_config(&self) -> Result<ListConfig, ConfigError> {
        let mut builder = ListConfig::builder(self.collection.clone())
            .select(self.select.clone())
            .search_fields(self.search_fields.iter().cloned());

        if let Some(order) = &self.default_order {
            builder = builder.order_by(order.column.clone(), order.ascending);
        }
        for (key, column) in &self.filter_map {
            builder = builder.map_filter(key.clone(), column.clone());
        }
        if let Some(column) = &self.scope_by_user_field {
            builder = builder.scope_by_user_field(column.clone());
        }

        builder.build()
    }
}

/// Complete list catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListsConfig {
    /// List definitions
    pub lists: Vec<ListDefinition>,
}

impl ListsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every definition and reject duplicate names
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for list in &self.lists {
            if !names.insert(list.name.as_str()) {
                return Err(ConfigError::DuplicateList {
                    name: list.name.clone(),
                });
            }
            list.to_list_config()?;
        }
        Ok(())
    }

    /// Find a list definition by name
    pub fn find(&self, name: &str) -> Option<&ListDefinition> {
        self.lists.iter().find(|list| list.name == name)
    }

    /// The fleet back-office lists
    pub fn default_config() -> Self {
        fn list(
            name: &str,
            search_fields: &[&str],
            filter_map: &[(&str, &str)],
            scoped: bool,
        ) -> ListDefinition {
            ListDefinition {
                name: name.to_string(),
                collection: name.to_string(),
                select: default_select(),
                default_order: Some(OrderConfig {
                    column: "created_at".to_string(),
                    ascending: false,
                }),
                search_fields: search_fields.iter().map(|s| s.to_string()).collect(),
                filter_map: filter_map
                    .iter()
                    .map(|(k, c)| (k.to_string(), c.to_string()))
                    .collect(),
                scope_by_user_field: scoped.then(|| "user_id".to_string()),
            }
        }

        Self {
            lists: vec![
                list("vehicles", &["plate", "model", "brand"], &[], false),
                list(
                    "employees",
                    &["name", "email", "phone"],
                    &[("role", "position")],
                    false,
                ),
                list(
                    "services",
                    &["description", "origin", "destination"],
                    &[("vehicle", "vehicle_id"), ("employee", "employee_id")],
                    false,
                ),
                list("accounts", &["name", "document"], &[("type", "account_type")], true),
                list("reports", &["title"], &[], true),
            ],
        }
    }
}
