//! Role permission table and the permission matcher.
//!
//! The table is static configuration: constructed once at startup, injected
//! into services, never mutated at runtime.

use std::collections::HashMap;

use masthead_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::security::{Action, Permission, Resource, Role, Scope};
use crate::user::User;

/// Resource selector of a grant: a single resource or the `*` wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GrantResource {
    /// Matches every resource.
    Any,
    /// Matches exactly one resource.
    One(Resource),
}

impl GrantResource {
    /// Returns whether this selector covers the given resource.
    #[must_use]
    pub fn covers(&self, resource: Resource) -> bool {
        match self {
            Self::Any => true,
            Self::One(granted) => *granted == resource,
        }
    }

    /// Returns a stable storage value for this selector.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "*",
            Self::One(resource) => resource.as_str(),
        }
    }
}

impl TryFrom<String> for GrantResource {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "*" {
            return Ok(Self::Any);
        }

        value.parse::<Resource>().map(Self::One)
    }
}

impl From<GrantResource> for String {
    fn from(value: GrantResource) -> Self {
        value.as_str().to_owned()
    }
}

/// One granted permission row in the role permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    resource: GrantResource,
    action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<Scope>,
}

impl Grant {
    /// Creates an unscoped grant for one resource.
    #[must_use]
    pub fn new(resource: Resource, action: Action) -> Self {
        Self {
            resource: GrantResource::One(resource),
            action,
            scope: None,
        }
    }

    /// Creates a scoped grant for one resource.
    #[must_use]
    pub fn scoped(resource: Resource, action: Action, scope: Scope) -> Self {
        Self {
            resource: GrantResource::One(resource),
            action,
            scope: Some(scope),
        }
    }

    /// Creates a wildcard-resource grant. With [`Action::Manage`] this is the
    /// superuser grant matching every request.
    #[must_use]
    pub fn any_resource(action: Action) -> Self {
        Self {
            resource: GrantResource::Any,
            action,
            scope: None,
        }
    }

    /// Returns the resource selector.
    #[must_use]
    pub fn resource(&self) -> GrantResource {
        self.resource
    }

    /// Returns the granted action.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns the granted scope, if any.
    #[must_use]
    pub fn scope(&self) -> Option<Scope> {
        self.scope
    }

    /// Returns whether this grant satisfies the requested permission.
    ///
    /// The wildcard-resource `manage` grant matches unconditionally; scope is
    /// not consulted. A wildcard resource with a specific action matches that
    /// action on every resource and then resolves scope normally.
    #[must_use]
    pub fn satisfies(&self, permission: &Permission) -> bool {
        if self.resource == GrantResource::Any && self.action == Action::Manage {
            return true;
        }

        if !self.resource.covers(permission.resource()) {
            return false;
        }

        if !self.action.subsumes(permission.action()) {
            return false;
        }

        match permission.scope() {
            None => true,
            Some(requested) => match self.scope {
                Some(Scope::All) => true,
                Some(granted) => granted == requested,
                None => false,
            },
        }
    }
}

/// Static mapping from role to granted permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePermissionTable {
    roles: HashMap<Role, Vec<Grant>>,
}

impl RolePermissionTable {
    /// Creates a table from explicit role grants.
    #[must_use]
    pub fn new(roles: HashMap<Role, Vec<Grant>>) -> Self {
        Self { roles }
    }

    /// Returns the default CMS role table.
    ///
    /// Admins hold the superuser wildcard, editors manage content and see
    /// orders, viewers read content and only their own orders.
    #[must_use]
    pub fn standard() -> Self {
        let mut roles = HashMap::new();

        roles.insert(Role::Admin, vec![Grant::any_resource(Action::Manage)]);
        roles.insert(
            Role::Editor,
            vec![
                Grant::scoped(Resource::Products, Action::Manage, Scope::All),
                Grant::scoped(Resource::Categories, Action::Manage, Scope::All),
                Grant::scoped(Resource::Media, Action::Manage, Scope::All),
                Grant::scoped(Resource::Orders, Action::Read, Scope::All),
                Grant::scoped(Resource::Orders, Action::Update, Scope::All),
                Grant::new(Resource::Analytics, Action::Read),
            ],
        );
        roles.insert(
            Role::Viewer,
            vec![
                Grant::scoped(Resource::Products, Action::Read, Scope::All),
                Grant::scoped(Resource::Categories, Action::Read, Scope::All),
                Grant::scoped(Resource::Media, Action::Read, Scope::All),
                Grant::scoped(Resource::Orders, Action::Read, Scope::Own),
            ],
        );

        Self { roles }
    }

    /// Loads a table from its JSON representation.
    pub fn from_json(value: &str) -> AppResult<Self> {
        serde_json::from_str(value).map_err(|error| {
            AppError::Validation(format!("invalid role permission table: {error}"))
        })
    }

    /// Returns the grants for a role, if the role is configured.
    #[must_use]
    pub fn grants_for(&self, role: Role) -> Option<&[Grant]> {
        self.roles.get(&role).map(Vec::as_slice)
    }

    /// Decides whether `user` may perform `permission`.
    ///
    /// Pure and deterministic for a fixed table. A single matching grant is
    /// sufficient, so grant ordering cannot change the outcome. Absent users,
    /// inactive users and unconfigured roles are denied.
    #[must_use]
    pub fn evaluate(&self, user: Option<&User>, permission: &Permission) -> bool {
        let Some(user) = user else {
            return false;
        };

        if !user.is_active() {
            return false;
        }

        let Some(grants) = self.grants_for(user.role()) else {
            return false;
        };

        grants.iter().any(|grant| grant.satisfies(permission))
    }
}
