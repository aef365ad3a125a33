use serde::{Deserialize, Serialize};

/// Logsource represents the logsource field in sigma rule
/// It defines relevant event streams and is used for grouping rules
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Logsource {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Product name (e.g., windows, linux)
    pub product: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Log category (e.g., process_creation, network_connection)
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Service name (e.g., sysmon, security)
    pub service: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Free-form description of the source
    pub definition: Option<String>,
}

impl Logsource {
    /// Check whether this logsource is compatible with the provided filters;
    /// a `None` filter accepts anything
    pub fn matches(&self, product: Option<&str>, category: Option<&str>, service: Option<&str>) -> bool {
        fn field_matches(filter: Option<&str>, own: &Option<String>) -> bool {
            match (filter, own) {
                (None, _) => true,
                (Some(f), Some(own)) => f == own,
                (Some(_), None) => false,
            }
        }

        field_matches(product, &self.product)
            && field_matches(category, &self.category)
            && field_matches(service, &self.service)
    }
}
