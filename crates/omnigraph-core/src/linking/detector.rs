//! Batch client/endpoint matching.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::route::{ClientRoute, RoutePattern};
use super::{HttpMethod, LinkError};
use crate::config::LinkConfig;
use crate::graph::Metadata;
use crate::ontology::{EdgeType, UniversalNodeId};

/// Metadata key a producer sets to mark a client route as runtime assembled.
const DYNAMIC_METADATA_KEY: &str = "dynamic";

/// How a client route relates to an endpoint route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Pattern,
    Dynamic,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Pattern => "pattern",
            Self::Dynamic => "dynamic",
        }
    }

    /// Edge type a link of this tier becomes in the graph.
    pub fn edge_type(&self) -> EdgeType {
        match self {
            Self::Exact => EdgeType::RouteExactMatch,
            Self::Pattern => EdgeType::RoutePatternMatch,
            Self::Dynamic => EdgeType::DynamicRoute,
        }
    }
}

/// A registered client call or endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisteredRoute {
    node_id: UniversalNodeId,
    method: HttpMethod,
    route: String,
    normalized: String,
    #[serde(skip_serializing_if = "Metadata::is_empty")]
    metadata: Metadata,
}

impl RegisteredRoute {
    pub fn node_id(&self) -> &UniversalNodeId {
        &self.node_id
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Route text as registered.
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// A detected client-to-endpoint relationship.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpLink {
    client_id: UniversalNodeId,
    endpoint_id: UniversalNodeId,
    method: HttpMethod,
    client_route: String,
    endpoint_route: String,
    match_type: MatchType,
    confidence: f64,
    candidates: usize,
    evidence: String,
}

impl HttpLink {
    pub fn client_id(&self) -> &UniversalNodeId {
        &self.client_id
    }

    pub fn endpoint_id(&self) -> &UniversalNodeId {
        &self.endpoint_id
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Normalized client route.
    pub fn client_route(&self) -> &str {
        &self.client_route
    }

    /// Normalized endpoint route.
    pub fn endpoint_route(&self) -> &str {
        &self.endpoint_route
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    /// The tier score for [`Self::match_type`].
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Number of endpoints the client linked to at this tier; more than one
    /// is ambiguous.
    pub fn candidates(&self) -> usize {
        self.candidates
    }

    pub fn is_ambiguous(&self) -> bool {
        self.candidates > 1
    }

    pub fn evidence(&self) -> &str {
        &self.evidence
    }
}

/// Output of one detection pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkReport {
    /// Links in client registration order, then endpoint registration order.
    pub links: Vec<HttpLink>,
    /// Clients that produced no link.
    pub unmatched_clients: Vec<RegisteredRoute>,
    /// Endpoints that produced no link.
    pub unmatched_endpoints: Vec<RegisteredRoute>,
}

#[derive(Debug, Clone)]
struct ClientCall {
    registration: RegisteredRoute,
    shape: ClientRoute,
}

#[derive(Debug, Clone)]
struct Endpoint {
    registration: RegisteredRoute,
    pattern: RoutePattern,
}

/// Registry of client calls and endpoints with batch matching.
///
/// Registration validates input and never matches; [`Self::detect`] never
/// fails. Detection is quadratic per HTTP method, so very large registries
/// should be split by the caller.
#[derive(Debug, Clone, Default)]
pub struct HttpLinkDetector {
    config: LinkConfig,
    clients: Vec<ClientCall>,
    endpoints: Vec<Endpoint>,
}

impl HttpLinkDetector {
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            clients: Vec::new(),
            endpoints: Vec::new(),
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Register a client call site.
    ///
    /// Metadata `dynamic: true` marks the route as runtime assembled.
    pub fn add_client_call(
        &mut self,
        node_id: UniversalNodeId,
        method: &str,
        route: &str,
        metadata: Option<Metadata>,
    ) -> Result<(), LinkError> {
        node_id.validate()?;
        let method: HttpMethod = method.parse()?;
        let metadata = metadata.unwrap_or_default();
        let hint = metadata
            .get(DYNAMIC_METADATA_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let shape = ClientRoute::parse(route, hint)?;

        tracing::debug!(
            client = %node_id,
            method = %method,
            route = shape.normalized(),
            dynamic = shape.is_dynamic(),
            "register client call"
        );
        self.clients.push(ClientCall {
            registration: RegisteredRoute {
                node_id,
                method,
                route: route.to_string(),
                normalized: shape.normalized().to_string(),
                metadata,
            },
            shape,
        });
        Ok(())
    }

    /// Register a server endpoint.
    pub fn add_endpoint(
        &mut self,
        node_id: UniversalNodeId,
        method: &str,
        route: &str,
        metadata: Option<Metadata>,
    ) -> Result<(), LinkError> {
        node_id.validate()?;
        let method: HttpMethod = method.parse()?;
        let pattern = RoutePattern::parse(route)?;

        tracing::debug!(
            endpoint = %node_id,
            method = %method,
            route = pattern.normalized(),
            "register endpoint"
        );
        self.endpoints.push(Endpoint {
            registration: RegisteredRoute {
                node_id,
                method,
                route: route.to_string(),
                normalized: pattern.normalized().to_string(),
                metadata: metadata.unwrap_or_default(),
            },
            pattern,
        });
        Ok(())
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Match every client against every endpoint with the same method.
    ///
    /// A client links only at its best tier: an exact route shadows
    /// parameterized ones, and a pattern match shadows dynamic ones. Every
    /// endpoint at that tier is linked and counted as a candidate.
    pub fn detect(&self) -> LinkReport {
        let mut by_method: BTreeMap<HttpMethod, Vec<usize>> = BTreeMap::new();
        for (index, endpoint) in self.endpoints.iter().enumerate() {
            by_method
                .entry(endpoint.registration.method)
                .or_default()
                .push(index);
        }

        let mut report = LinkReport::default();
        let mut endpoint_linked = vec![false; self.endpoints.len()];

        for client in &self.clients {
            let candidates = by_method
                .get(&client.registration.method)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let matches: Vec<(usize, MatchType)> = candidates
                .iter()
                .filter_map(|&index| {
                    self.match_tier(client, &self.endpoints[index])
                        .map(|tier| (index, tier))
                })
                .collect();

            let Some(best) = matches.iter().map(|&(_, tier)| tier).min() else {
                report.unmatched_clients.push(client.registration.clone());
                continue;
            };
            let matches: Vec<usize> = matches
                .into_iter()
                .filter(|&(_, tier)| tier == best)
                .map(|(index, _)| index)
                .collect();

            for &index in &matches {
                let match_type = best;
                endpoint_linked[index] = true;
                let link = self.link(client, &self.endpoints[index], match_type, matches.len());
                tracing::debug!(
                    client = %link.client_id,
                    endpoint = %link.endpoint_id,
                    match_type = match_type.as_str(),
                    confidence = link.confidence,
                    "http link"
                );
                report.links.push(link);
            }
        }

        report.unmatched_endpoints = self
            .endpoints
            .iter()
            .zip(&endpoint_linked)
            .filter(|&(_, &linked)| !linked)
            .map(|(endpoint, _)| endpoint.registration.clone())
            .collect();

        tracing::info!(
            clients = self.clients.len(),
            endpoints = self.endpoints.len(),
            links = report.links.len(),
            unmatched_clients = report.unmatched_clients.len(),
            unmatched_endpoints = report.unmatched_endpoints.len(),
            "http link detection complete"
        );
        report
    }

    /// Links from a fresh detection pass.
    pub fn detect_links(&self) -> Vec<HttpLink> {
        self.detect().links
    }

    /// Clients that link to nothing.
    pub fn get_unmatched_clients(&self) -> Vec<RegisteredRoute> {
        self.detect().unmatched_clients
    }

    /// Endpoints nothing links to.
    pub fn get_unmatched_endpoints(&self) -> Vec<RegisteredRoute> {
        self.detect().unmatched_endpoints
    }

    /// Drop all registrations.
    pub fn clear(&mut self) {
        self.clients.clear();
        self.endpoints.clear();
    }

    /// First tier, in priority order, under which the pair matches.
    fn match_tier(&self, client: &ClientCall, endpoint: &Endpoint) -> Option<MatchType> {
        let route = client.shape.normalized();

        if route == endpoint.pattern.normalized() {
            return Some(MatchType::Exact);
        }
        if endpoint.pattern.has_params() && endpoint.pattern.matches(route) {
            return Some(MatchType::Pattern);
        }
        if client.shape.is_dynamic() && self.shares_literals(&client.shape, &endpoint.pattern) {
            return Some(MatchType::Dynamic);
        }
        None
    }

    fn shares_literals(&self, client: &ClientRoute, endpoint: &RoutePattern) -> bool {
        let min = self.config.dynamic_min_segments;
        let prefix = client.literal_prefix();
        let suffix = client.literal_suffix();

        (prefix.len() >= min && endpoint.starts_with(prefix))
            || (suffix.len() >= min && endpoint.ends_with(suffix))
    }

    fn link(
        &self,
        client: &ClientCall,
        endpoint: &Endpoint,
        match_type: MatchType,
        candidates: usize,
    ) -> HttpLink {
        let confidence = match match_type {
            MatchType::Exact => self.config.exact_score,
            MatchType::Pattern => self.config.pattern_score,
            MatchType::Dynamic => self.config.dynamic_score,
        };

        let mut evidence = format!(
            "{} route match: {} {} -> {}",
            match_type.as_str(),
            client.registration.method,
            client.registration.normalized,
            endpoint.registration.normalized
        );
        if candidates > 1 {
            evidence.push_str(&format!("; ambiguous: {} candidate endpoints", candidates));
        }

        HttpLink {
            client_id: client.registration.node_id.clone(),
            endpoint_id: endpoint.registration.node_id.clone(),
            method: client.registration.method,
            client_route: client.registration.normalized.clone(),
            endpoint_route: endpoint.registration.normalized.clone(),
            match_type,
            confidence,
            candidates,
            evidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::NodeType;
    use serde_json::json;

    fn client(name: &str) -> UniversalNodeId {
        UniversalNodeId::new("typescript", "web.api", NodeType::Client, name)
    }

    fn endpoint(name: &str) -> UniversalNodeId {
        UniversalNodeId::new("python", "app.routes", NodeType::Endpoint, name)
    }

    #[test]
    fn test_pattern_match() {
        let mut detector = HttpLinkDetector::default();
        detector.add_client_call(client("getUser"), "GET", "/api/users/123", None).unwrap();
        detector.add_endpoint(endpoint("get_user"), "GET", "/api/users/{id}", None).unwrap();

        let links = detector.detect_links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].match_type(), MatchType::Pattern);
        assert_eq!(links[0].confidence(), 0.8);
        assert_eq!(links[0].candidates(), 1);
    }

    #[test]
    fn test_exact_match_wins() {
        let mut detector = HttpLinkDetector::default();
        detector.add_client_call(client("list"), "get", "http://api.local/api/users/", None).unwrap();
        detector.add_endpoint(endpoint("list"), "GET", "/api/users", None).unwrap();

        let links = detector.detect_links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].match_type(), MatchType::Exact);
        assert_eq!(links[0].confidence(), 0.95);
        assert_eq!(links[0].match_type().edge_type(), EdgeType::RouteExactMatch);
    }

    #[test]
    fn test_method_must_agree() {
        let mut detector = HttpLinkDetector::default();
        detector.add_client_call(client("create"), "POST", "/api/users", None).unwrap();
        detector.add_endpoint(endpoint("list"), "GET", "/api/users", None).unwrap();

        let report = detector.detect();
        assert!(report.links.is_empty());
        assert_eq!(report.unmatched_clients.len(), 1);
        assert_eq!(report.unmatched_endpoints.len(), 1);
    }

    #[test]
    fn test_dynamic_match() {
        let mut detector = HttpLinkDetector::default();
        detector
            .add_client_call(client("orders"), "GET", "`/api/users/${id}/orders/${orderId}`", None)
            .unwrap();
        detector.add_endpoint(endpoint("orders"), "GET", "/api/users/{id}/orders", None).unwrap();

        let links = detector.detect_links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].match_type(), MatchType::Dynamic);
        assert_eq!(links[0].confidence(), 0.5);
    }

    #[test]
    fn test_dynamic_hint_from_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("dynamic".to_string(), json!(true));

        let mut detector = HttpLinkDetector::default();
        detector.add_client_call(client("search"), "GET", "/api/search", Some(metadata)).unwrap();
        detector.add_endpoint(endpoint("search"), "GET", "/api/search/advanced", None).unwrap();

        let links = detector.detect_links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].match_type(), MatchType::Dynamic);
    }

    #[test]
    fn test_static_client_never_dynamic() {
        let mut detector = HttpLinkDetector::default();
        detector.add_client_call(client("search"), "GET", "/api/search", None).unwrap();
        detector.add_endpoint(endpoint("search"), "GET", "/api/search/advanced", None).unwrap();
        assert!(detector.detect_links().is_empty());
    }

    #[test]
    fn test_ambiguity_is_reported() {
        let mut detector = HttpLinkDetector::default();
        detector.add_client_call(client("getUser"), "GET", "/api/users/me", None).unwrap();
        detector.add_endpoint(endpoint("by_id"), "GET", "/api/users/{id}", None).unwrap();
        detector.add_endpoint(endpoint("by_name"), "GET", "/api/users/<name>", None).unwrap();

        let links = detector.detect_links();
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.candidates() == 2 && l.is_ambiguous()));
        assert!(links[0].evidence().contains("2 candidate endpoints"));
        assert_eq!(links[0].endpoint_id().name(), "by_id");
    }

    #[test]
    fn test_better_tier_shadows_worse() {
        let mut detector = HttpLinkDetector::default();
        detector
            .add_client_call(client("orders"), "GET", "`/api/orders/${id}`", None)
            .unwrap();
        detector.add_endpoint(endpoint("by_id"), "GET", "/api/orders/{id}", None).unwrap();
        detector.add_endpoint(endpoint("items"), "GET", "/api/orders/{id}/items", None).unwrap();

        let report = detector.detect();
        assert_eq!(report.links.len(), 1);
        assert_eq!(report.links[0].match_type(), MatchType::Pattern);
        assert_eq!(report.links[0].candidates(), 1);
        assert_eq!(report.unmatched_endpoints.len(), 1);
        assert_eq!(report.unmatched_endpoints[0].node_id(), &endpoint("items"));
    }

    #[test]
    fn test_registration_validation() {
        let mut detector = HttpLinkDetector::default();
        assert_eq!(
            detector.add_client_call(client("x"), "GET", "", None),
            Err(LinkError::EmptyRoute)
        );
        assert!(matches!(
            detector.add_endpoint(endpoint("get:user"), "GET", "/x", None),
            Err(LinkError::NodeId(_))
        ));
        assert_eq!(
            detector.add_endpoint(endpoint("x"), "", "/x", None),
            Err(LinkError::MissingMethod)
        );
        assert_eq!(detector.client_count(), 0);
        assert_eq!(detector.endpoint_count(), 0);
    }
}
