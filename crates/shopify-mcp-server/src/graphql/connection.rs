use serde::{Deserialize, Serialize};

/// Pagination metadata of a connection. Cursors are opaque and must be
/// passed back to the API exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// A list of `T` as returned by a GraphQL connection field.
///
/// The Admin API exposes lists either as `edges { node }` or as a flattened
/// `nodes` list; both deserialize into the same value so callers never see
/// which wrapper the operation selected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    edges: Option<Vec<Edge<T>>>,
    nodes: Option<Vec<T>>,
    page_info: Option<PageInfo>,
}

#[derive(Debug, Clone, Deserialize)]
struct Edge<T> {
    node: T,
}

impl<T> Connection<T> {
    /// The page metadata, if the operation selected it
    pub fn page_info(&self) -> Option<&PageInfo> {
        self.page_info.as_ref()
    }

    /// Unwrap the list, in the order the API returned it
    pub fn into_nodes(self) -> Vec<T> {
        match (self.edges, self.nodes) {
            (Some(edges), _) => edges.into_iter().map(|edge| edge.node).collect(),
            (None, Some(nodes)) => nodes,
            (None, None) => Vec::new(),
        }
    }

    /// Unwrap the list along with its page metadata
    pub fn into_page(self) -> (Vec<T>, Option<PageInfo>) {
        let page_info = self.page_info.clone();
        (self.into_nodes(), page_info)
    }

    pub fn first(self) -> Option<T> {
        self.into_nodes().into_iter().next()
    }
}
