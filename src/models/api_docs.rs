use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    pub method: String,
    pub path: String,
    pub description: String,
    pub parameters: Vec<ApiParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiParameter {
    pub name: String,
    pub param_type: String,
    pub required: bool,
}

/// Deduplication identity of an endpoint: uppercased method plus the path as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointKey {
    pub method: String,
    pub path: String,
}

impl EndpointKey {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.trim().to_uppercase(),
            path: path.trim().to_string(),
        }
    }
}

impl ApiEndpoint {
    pub fn new(method: &str, path: &str, description: impl Into<String>) -> Self {
        Self {
            method: method.trim().to_uppercase(),
            path: path.trim().to_string(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<ApiParameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn key(&self) -> EndpointKey {
        EndpointKey::new(&self.method, &self.path)
    }

    pub fn full_endpoint(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    /// Parameters as `name (type)` joined by commas, required ones marked with `*`.
    pub fn parameter_summary(&self) -> String {
        self.parameters
            .iter()
            .map(|param| {
                let marker = if param.required { "*" } else { "" };
                if param.param_type.is_empty() {
                    format!("{}{}", param.name, marker)
                } else {
                    format!("{}{} ({})", param.name, marker, param.param_type)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Insertion-ordered endpoint collection that keeps the first endpoint seen for each key.
#[derive(Debug, Clone, Default)]
pub struct EndpointSet {
    endpoints: Vec<ApiEndpoint>,
    seen: HashSet<EndpointKey>,
}

impl EndpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the endpoint was new and has been added.
    pub fn insert(&mut self, endpoint: ApiEndpoint) -> bool {
        if self.seen.insert(endpoint.key()) {
            self.endpoints.push(endpoint);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApiEndpoint> {
        self.endpoints.iter()
    }

    pub fn as_slice(&self) -> &[ApiEndpoint] {
        &self.endpoints
    }

    pub fn into_vec(self) -> Vec<ApiEndpoint> {
        self.endpoints
    }
}

impl FromIterator<ApiEndpoint> for EndpointSet {
    fn from_iter<I: IntoIterator<Item = ApiEndpoint>>(iter: I) -> Self {
        let mut set = Self::new();
        for endpoint in iter {
            set.insert(endpoint);
        }
        set
    }
}

/// Everything learned about one company's API in a single run.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryResult {
    pub company_name: String,
    pub has_api: bool,
    pub api_type: String,
    pub base_url: String,
    pub documentation_url: Option<String>,
    pub endpoints: EndpointSet,
    pub rounds: usize,
    pub error: Option<String>,
}

impl DiscoveryResult {
    pub fn empty(company_name: &str, error: impl Into<String>) -> Self {
        Self {
            company_name: company_name.to_string(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Wraps the heuristic scraper's output so it can share the exporter.
    pub fn from_scrape(company_name: &str, doc_url: &str, endpoints: Vec<ApiEndpoint>) -> Self {
        Self {
            company_name: company_name.to_string(),
            has_api: true,
            documentation_url: Some(doc_url.to_string()),
            endpoints: endpoints.into_iter().collect(),
            ..Self::default()
        }
    }
}
