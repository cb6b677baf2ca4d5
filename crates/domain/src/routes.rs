//! Route permission mapping: URL path + HTTP method to required permissions.
//!
//! The table is static configuration. Declaration order is match order, so
//! overlapping patterns resolve deterministically.

use std::str::FromStr;

use masthead_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::security::Permission;

/// HTTP methods recognized by route rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Read requests.
    Get,
    /// Creation requests.
    Post,
    /// Full-replacement updates.
    Put,
    /// Partial updates.
    Patch,
    /// Deletion requests.
    Delete,
}

impl HttpMethod {
    /// Returns the canonical method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown http method '{value}'"
            ))),
        }
    }
}

/// Combination mode for routes requiring more than one permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionRequirementMode {
    /// Any single required permission suffices.
    #[default]
    Any,
    /// Every required permission must hold.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Literal(String),
    Parameter(String),
}

/// A validated route pattern such as `/admin/products/:id/edit`.
///
/// Parameters are written `:name` or `[name]` and match exactly one
/// non-empty path segment. Invalid patterns are rejected at construction so
/// configuration errors surface at startup, not at request time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoutePattern {
    raw: String,
    segments: Vec<PatternSegment>,
}

impl RoutePattern {
    /// Parses and validates a route pattern.
    pub fn parse(value: impl Into<String>) -> AppResult<Self> {
        let raw = value.into();

        if !raw.starts_with('/') {
            return Err(AppError::Validation(format!(
                "route pattern '{raw}' must start with '/'"
            )));
        }

        if raw == "/" {
            return Ok(Self {
                raw,
                segments: Vec::new(),
            });
        }

        if raw.ends_with('/') {
            return Err(AppError::Validation(format!(
                "route pattern '{raw}' must not end with '/'"
            )));
        }

        let mut segments = Vec::new();
        for segment in raw[1..].split('/') {
            if segment.is_empty() {
                return Err(AppError::Validation(format!(
                    "route pattern '{raw}' contains an empty segment"
                )));
            }

            let parameter = if let Some(name) = segment.strip_prefix(':') {
                Some(name)
            } else if segment.starts_with('[') {
                let Some(name) = segment
                    .strip_prefix('[')
                    .and_then(|inner| inner.strip_suffix(']'))
                else {
                    return Err(AppError::Validation(format!(
                        "route pattern '{raw}' has an unclosed parameter segment '{segment}'"
                    )));
                };
                Some(name)
            } else {
                None
            };

            match parameter {
                Some(name) if name.is_empty() => {
                    return Err(AppError::Validation(format!(
                        "route pattern '{raw}' has a parameter segment without a name"
                    )));
                }
                Some(name) => segments.push(PatternSegment::Parameter(name.to_owned())),
                None => segments.push(PatternSegment::Literal(segment.to_owned())),
            }
        }

        Ok(Self { raw, segments })
    }

    /// Returns the original pattern string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    /// Returns whether the pattern contains no parameters.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.segments
            .iter()
            .all(|segment| matches!(segment, PatternSegment::Literal(_)))
    }

    /// Returns whether the pattern matches a concrete request path.
    ///
    /// A single trailing slash on the candidate is tolerated.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let trimmed = if path.len() > 1 {
            path.strip_suffix('/').unwrap_or(path)
        } else {
            path
        };

        if !trimmed.starts_with('/') {
            return false;
        }

        if trimmed == "/" {
            return self.segments.is_empty();
        }

        let candidate: Vec<&str> = trimmed[1..].split('/').collect();
        if candidate.len() != self.segments.len() {
            return false;
        }

        self.segments
            .iter()
            .zip(candidate)
            .all(|(segment, value)| match segment {
                PatternSegment::Literal(literal) => literal == value,
                PatternSegment::Parameter(_) => !value.is_empty(),
            })
    }
}

impl TryFrom<String> for RoutePattern {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<RoutePattern> for String {
    fn from(value: RoutePattern) -> Self {
        value.raw
    }
}

/// One route rule: pattern + optional method + required permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pattern: RoutePattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    method: Option<HttpMethod>,
    required: Vec<Permission>,
}

impl RouteRule {
    /// Creates a validated route rule. A `None` method matches any method.
    pub fn new(
        pattern: impl Into<String>,
        method: Option<HttpMethod>,
        required: Vec<Permission>,
    ) -> AppResult<Self> {
        Ok(Self {
            pattern: RoutePattern::parse(pattern)?,
            method,
            required,
        })
    }

    /// Returns the route pattern.
    #[must_use]
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Returns the method restriction, if any.
    #[must_use]
    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    /// Returns the permissions required to access the route.
    #[must_use]
    pub fn required_permissions(&self) -> &[Permission] {
        self.required.as_slice()
    }

    fn allows_method(&self, method: HttpMethod) -> bool {
        self.method.is_none_or(|restricted| restricted == method)
    }
}

/// Ordered route permission table plus a public-route allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    #[serde(default)]
    public_prefixes: Vec<String>,
}

impl RouteTable {
    /// Creates a table from explicit rules and public path prefixes.
    ///
    /// Prefixes must start with `/`; a bare `/` prefix is rejected because it
    /// would make every route public.
    pub fn new(rules: Vec<RouteRule>, public_prefixes: Vec<String>) -> AppResult<Self> {
        for prefix in &public_prefixes {
            if !prefix.starts_with('/') || prefix == "/" {
                return Err(AppError::Validation(format!(
                    "public route prefix '{prefix}' must start with '/' and not be the root"
                )));
            }
        }

        Ok(Self {
            rules,
            public_prefixes,
        })
    }

    /// Returns the default CMS admin route table.
    pub fn standard() -> AppResult<Self> {
        use crate::security::{Action, Resource};

        let rules = vec![
            RouteRule::new(
                "/admin/products",
                Some(HttpMethod::Get),
                vec![Permission::new(Resource::Products, Action::Read)],
            )?,
            RouteRule::new(
                "/admin/products",
                Some(HttpMethod::Post),
                vec![Permission::new(Resource::Products, Action::Create)],
            )?,
            RouteRule::new(
                "/admin/products/:id",
                Some(HttpMethod::Get),
                vec![Permission::new(Resource::Products, Action::Read)],
            )?,
            RouteRule::new(
                "/admin/products/:id",
                Some(HttpMethod::Put),
                vec![Permission::new(Resource::Products, Action::Update)],
            )?,
            RouteRule::new(
                "/admin/products/:id",
                Some(HttpMethod::Delete),
                vec![Permission::new(Resource::Products, Action::Delete)],
            )?,
            RouteRule::new(
                "/admin/products/:id/edit",
                Some(HttpMethod::Get),
                vec![Permission::new(Resource::Products, Action::Update)],
            )?,
            RouteRule::new(
                "/admin/categories",
                Some(HttpMethod::Get),
                vec![Permission::new(Resource::Categories, Action::Read)],
            )?,
            RouteRule::new(
                "/admin/categories",
                Some(HttpMethod::Post),
                vec![Permission::new(Resource::Categories, Action::Create)],
            )?,
            RouteRule::new(
                "/admin/categories/:id",
                None,
                vec![Permission::new(Resource::Categories, Action::Update)],
            )?,
            RouteRule::new(
                "/admin/orders",
                Some(HttpMethod::Get),
                vec![Permission::new(Resource::Orders, Action::Read)],
            )?,
            RouteRule::new(
                "/admin/orders/:id",
                Some(HttpMethod::Get),
                vec![Permission::new(Resource::Orders, Action::Read)],
            )?,
            RouteRule::new(
                "/admin/orders/:id",
                Some(HttpMethod::Put),
                vec![Permission::new(Resource::Orders, Action::Update)],
            )?,
            RouteRule::new(
                "/admin/users",
                Some(HttpMethod::Get),
                vec![Permission::new(Resource::Users, Action::Read)],
            )?,
            RouteRule::new(
                "/admin/users",
                Some(HttpMethod::Post),
                vec![Permission::new(Resource::Users, Action::Create)],
            )?,
            RouteRule::new(
                "/admin/users/:id",
                Some(HttpMethod::Delete),
                vec![Permission::new(Resource::Users, Action::Delete)],
            )?,
            RouteRule::new(
                "/admin/users/:id/edit",
                Some(HttpMethod::Get),
                vec![Permission::new(Resource::Users, Action::Update)],
            )?,
            RouteRule::new(
                "/admin/media",
                None,
                vec![
                    Permission::new(Resource::Media, Action::Read),
                    Permission::new(Resource::Media, Action::Manage),
                ],
            )?,
            RouteRule::new(
                "/admin/settings",
                Some(HttpMethod::Get),
                vec![Permission::new(Resource::Settings, Action::Read)],
            )?,
            RouteRule::new(
                "/admin/settings",
                Some(HttpMethod::Put),
                vec![Permission::new(Resource::Settings, Action::Update)],
            )?,
            RouteRule::new(
                "/admin/analytics",
                Some(HttpMethod::Get),
                vec![Permission::new(Resource::Analytics, Action::Read)],
            )?,
        ];

        Self::new(
            rules,
            vec![
                "/login".to_owned(),
                "/logout".to_owned(),
                "/register".to_owned(),
                "/password-reset".to_owned(),
                "/api/auth".to_owned(),
                "/health".to_owned(),
            ],
        )
    }

    /// Loads a table from its JSON representation.
    pub fn from_json(value: &str) -> AppResult<Self> {
        let table: Self = serde_json::from_str(value)
            .map_err(|error| AppError::Validation(format!("invalid route table: {error}")))?;

        Self::new(table.rules, table.public_prefixes)
    }

    /// Returns the configured rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[RouteRule] {
        self.rules.as_slice()
    }

    /// Resolves the permissions required for a path and method.
    ///
    /// Exact (parameter-free) rules win over patterns; within each group the
    /// first declared match wins. Unconfigured routes resolve to an empty
    /// list, meaning no specific permission beyond authentication.
    #[must_use]
    pub fn required_permissions(&self, path: &str, method: HttpMethod) -> &[Permission] {
        let exact = self.rules.iter().find(|rule| {
            rule.allows_method(method) && rule.pattern.is_exact() && rule.pattern.matches(path)
        });
        if let Some(rule) = exact {
            return rule.required_permissions();
        }

        let pattern = self.rules.iter().find(|rule| {
            rule.allows_method(method) && !rule.pattern.is_exact() && rule.pattern.matches(path)
        });
        pattern.map_or(&[], RouteRule::required_permissions)
    }

    /// Returns whether the path is on the public allow-list, exempt from
    /// permission checks entirely.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use masthead_core::AppResult;

    use crate::security::{Action, Permission, Resource};

    use super::{HttpMethod, RoutePattern, RouteRule, RouteTable};

    #[test]
    fn pattern_without_leading_slash_is_rejected() {
        assert!(RoutePattern::parse("admin/products").is_err());
    }

    #[test]
    fn pattern_with_empty_segment_is_rejected() {
        assert!(RoutePattern::parse("/admin//products").is_err());
    }

    #[test]
    fn pattern_with_unnamed_parameter_is_rejected() {
        assert!(RoutePattern::parse("/admin/products/:").is_err());
        assert!(RoutePattern::parse("/admin/products/[]").is_err());
    }

    #[test]
    fn pattern_with_unclosed_bracket_is_rejected() {
        assert!(RoutePattern::parse("/admin/products/[id").is_err());
    }

    #[test]
    fn parameter_matches_any_single_segment() -> AppResult<()> {
        let pattern = RoutePattern::parse("/admin/products/:id/edit")?;
        assert!(pattern.matches("/admin/products/42/edit"));
        assert!(pattern.matches("/admin/products/sku-9/edit"));
        assert!(!pattern.matches("/admin/products/42/7/edit"));
        assert!(!pattern.matches("/admin/products/42"));
        Ok(())
    }

    #[test]
    fn bracket_parameter_syntax_is_supported() -> AppResult<()> {
        let pattern = RoutePattern::parse("/admin/orders/[id]")?;
        assert!(pattern.matches("/admin/orders/1001"));
        assert!(!pattern.matches("/admin/orders"));
        Ok(())
    }

    #[test]
    fn trailing_slash_on_candidate_is_tolerated() -> AppResult<()> {
        let pattern = RoutePattern::parse("/admin/users")?;
        assert!(pattern.matches("/admin/users/"));
        Ok(())
    }

    #[test]
    fn exact_rule_wins_over_earlier_pattern() -> AppResult<()> {
        let table = RouteTable::new(
            vec![
                RouteRule::new(
                    "/admin/products/:id",
                    None,
                    vec![Permission::new(Resource::Products, Action::Update)],
                )?,
                RouteRule::new(
                    "/admin/products/new",
                    None,
                    vec![Permission::new(Resource::Products, Action::Create)],
                )?,
            ],
            Vec::new(),
        )?;

        let required = table.required_permissions("/admin/products/new", HttpMethod::Get);
        assert_eq!(
            required,
            &[Permission::new(Resource::Products, Action::Create)]
        );
        Ok(())
    }

    #[test]
    fn first_declared_pattern_wins_among_overlaps() -> AppResult<()> {
        let table = RouteTable::new(
            vec![
                RouteRule::new(
                    "/admin/:section",
                    None,
                    vec![Permission::new(Resource::Settings, Action::Read)],
                )?,
                RouteRule::new(
                    "/admin/:other",
                    None,
                    vec![Permission::new(Resource::Settings, Action::Update)],
                )?,
            ],
            Vec::new(),
        )?;

        let required = table.required_permissions("/admin/anything", HttpMethod::Get);
        assert_eq!(
            required,
            &[Permission::new(Resource::Settings, Action::Read)]
        );
        Ok(())
    }

    #[test]
    fn method_restriction_filters_rules() -> AppResult<()> {
        let table = RouteTable::standard()?;

        let read = table.required_permissions("/admin/products", HttpMethod::Get);
        assert_eq!(read, &[Permission::new(Resource::Products, Action::Read)]);

        let create = table.required_permissions("/admin/products", HttpMethod::Post);
        assert_eq!(
            create,
            &[Permission::new(Resource::Products, Action::Create)]
        );
        Ok(())
    }

    #[test]
    fn unconfigured_route_resolves_to_empty_list() -> AppResult<()> {
        let table = RouteTable::standard()?;
        let required = table.required_permissions("/account/profile", HttpMethod::Get);
        assert!(required.is_empty());
        Ok(())
    }

    #[test]
    fn public_prefix_matches_nested_paths() -> AppResult<()> {
        let table = RouteTable::standard()?;
        assert!(table.is_public("/api/auth/callback"));
        assert!(table.is_public("/login"));
        assert!(!table.is_public("/admin/products"));
        Ok(())
    }

    #[test]
    fn root_public_prefix_is_rejected() {
        let result = RouteTable::new(Vec::new(), vec!["/".to_owned()]);
        assert!(result.is_err());
    }

    #[test]
    fn table_roundtrips_through_json() -> AppResult<()> {
        let table = RouteTable::standard()?;
        let encoded = serde_json::to_string(&table).map_err(|error| {
            masthead_core::AppError::Internal(format!("encode failed: {error}"))
        })?;
        let restored = RouteTable::from_json(&encoded)?;
        assert_eq!(restored, table);
        Ok(())
    }

    #[test]
    fn malformed_route_table_json_is_rejected() {
        let result = RouteTable::from_json(r#"{"rules":[{"pattern":"no-slash","required":[]}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn http_method_parses_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>().ok(), Some(HttpMethod::Get));
        assert_eq!("DELETE".parse::<HttpMethod>().ok(), Some(HttpMethod::Delete));
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }
}
