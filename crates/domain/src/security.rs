//! Permission vocabulary: roles, resources, actions and scopes.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use masthead_core::AppError;
use serde::{Deserialize, Serialize};

/// Coarse-grained identity classification with a strict hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access, hierarchy level 3.
    Admin,
    /// Content management access, hierarchy level 2.
    Editor,
    /// Read-mostly access, hierarchy level 1.
    Viewer,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// Returns the hierarchy level. Higher levels subsume lower ones.
    #[must_use]
    pub fn level(&self) -> u8 {
        match self {
            Self::Admin => 3,
            Self::Editor => 2,
            Self::Viewer => 1,
        }
    }

    /// Returns whether this role meets or exceeds the required role.
    #[must_use]
    pub fn has_minimum(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    /// Returns whether this role may manage accounts holding `other`.
    ///
    /// Management requires a strictly higher hierarchy level; peers cannot
    /// manage each other.
    #[must_use]
    pub fn can_manage(&self, other: Role) -> bool {
        self.level() > other.level()
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::Admin, Role::Editor, Role::Viewer];

        ALL
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

/// Resources managed through the CMS admin surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Catalog products.
    Products,
    /// Catalog categories.
    Categories,
    /// Customer orders.
    Orders,
    /// User accounts.
    Users,
    /// Uploaded media assets.
    Media,
    /// Site-wide settings.
    Settings,
    /// Traffic and sales analytics.
    Analytics,
}

impl Resource {
    /// Returns a stable storage value for this resource.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Orders => "orders",
            Self::Users => "users",
            Self::Media => "media",
            Self::Settings => "settings",
            Self::Analytics => "analytics",
        }
    }

    /// Returns all known resources.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Resource] = &[
            Resource::Products,
            Resource::Categories,
            Resource::Orders,
            Resource::Users,
            Resource::Media,
            Resource::Settings,
            Resource::Analytics,
        ];

        ALL
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "products" => Ok(Self::Products),
            "categories" => Ok(Self::Categories),
            "orders" => Ok(Self::Orders),
            "users" => Ok(Self::Users),
            "media" => Ok(Self::Media),
            "settings" => Ok(Self::Settings),
            "analytics" => Ok(Self::Analytics),
            _ => Err(AppError::Validation(format!(
                "unknown resource value '{value}'"
            ))),
        }
    }
}

/// Operations a permission can grant on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create new records.
    Create,
    /// Read records and listings.
    Read,
    /// Update existing records.
    Update,
    /// Delete records.
    Delete,
    /// Aggregate action subsuming create, read, update and delete.
    Manage,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Manage => "manage",
        }
    }

    /// Returns whether a grant of this action satisfies a request for
    /// `requested`.
    ///
    /// `Manage` is a one-way superset: granting it satisfies any action,
    /// but granting a CRUD action never satisfies a `Manage` request.
    #[must_use]
    pub fn subsumes(&self, requested: Action) -> bool {
        *self == Self::Manage || *self == requested
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::Manage,
        ];

        ALL
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "manage" => Ok(Self::Manage),
            _ => Err(AppError::Validation(format!(
                "unknown action value '{value}'"
            ))),
        }
    }
}

/// Qualifier narrowing a permission to the acting user's own resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Only resources owned by the acting user.
    Own,
    /// All resources regardless of owner.
    All,
}

impl Scope {
    /// Returns a stable storage value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::All => "all",
        }
    }
}

impl FromStr for Scope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "own" => Ok(Self::Own),
            "all" => Ok(Self::All),
            _ => Err(AppError::Validation(format!(
                "unknown scope value '{value}'"
            ))),
        }
    }
}

/// A requested (resource, action, scope) triple describing one operation.
///
/// An unset scope means any granted scope is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    resource: Resource,
    action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<Scope>,
}

impl Permission {
    /// Creates an unscoped permission request.
    #[must_use]
    pub fn new(resource: Resource, action: Action) -> Self {
        Self {
            resource,
            action,
            scope: None,
        }
    }

    /// Creates a permission request narrowed to a scope.
    #[must_use]
    pub fn scoped(resource: Resource, action: Action, scope: Scope) -> Self {
        Self {
            resource,
            action,
            scope: Some(scope),
        }
    }

    /// Returns the requested resource.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Returns the requested action.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns the requested scope, if any.
    #[must_use]
    pub fn scope(&self) -> Option<Scope> {
        self.scope
    }
}

impl Display for Permission {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self.scope {
            Some(scope) => write!(
                formatter,
                "{}:{}:{}",
                self.resource.as_str(),
                self.action.as_str(),
                scope.as_str()
            ),
            None => write!(
                formatter,
                "{}:{}",
                self.resource.as_str(),
                self.action.as_str()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Action, Permission, Resource, Role, Scope};

    #[test]
    fn role_hierarchy_orders_levels() {
        assert!(Role::Admin.has_minimum(Role::Viewer));
        assert!(Role::Editor.has_minimum(Role::Editor));
        assert!(!Role::Viewer.has_minimum(Role::Editor));
    }

    #[test]
    fn role_management_requires_strictly_higher_level() {
        assert!(Role::Admin.can_manage(Role::Editor));
        assert!(!Role::Editor.can_manage(Role::Editor));
        assert!(!Role::Viewer.can_manage(Role::Admin));
    }

    #[test]
    fn manage_subsumes_every_action() {
        for action in Action::all() {
            assert!(Action::Manage.subsumes(*action));
        }
    }

    #[test]
    fn crud_action_does_not_subsume_manage() {
        assert!(!Action::Read.subsumes(Action::Manage));
        assert!(Action::Read.subsumes(Action::Read));
        assert!(!Action::Read.subsumes(Action::Delete));
    }

    #[test]
    fn role_roundtrip_storage_value() {
        for role in Role::all() {
            let restored = Role::from_str(role.as_str());
            assert_eq!(restored.unwrap_or(Role::Viewer), *role);
        }
    }

    #[test]
    fn unknown_resource_is_rejected() {
        assert!(Resource::from_str("invoices").is_err());
    }

    #[test]
    fn permission_display_includes_scope_when_set() {
        let unscoped = Permission::new(Resource::Products, Action::Delete);
        assert_eq!(unscoped.to_string(), "products:delete");

        let scoped = Permission::scoped(Resource::Orders, Action::Read, Scope::Own);
        assert_eq!(scoped.to_string(), "orders:read:own");
    }
}
