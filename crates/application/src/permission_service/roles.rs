use masthead_domain::Role;

use super::*;

impl PermissionService {
    /// Returns whether the user is an active administrator.
    #[must_use]
    pub fn is_admin(&self, user: Option<&User>) -> bool {
        self.has_minimum_role(user, Role::Admin)
    }

    /// Returns whether the user holds at least editor rank.
    #[must_use]
    pub fn is_editor(&self, user: Option<&User>) -> bool {
        self.has_minimum_role(user, Role::Editor)
    }

    /// Returns whether the user holds at least viewer rank, i.e. is any
    /// active authenticated user.
    #[must_use]
    pub fn is_viewer(&self, user: Option<&User>) -> bool {
        self.has_minimum_role(user, Role::Viewer)
    }

    /// Returns whether the user is active and meets the required role level.
    #[must_use]
    pub fn has_minimum_role(&self, user: Option<&User>, required: Role) -> bool {
        user.is_some_and(|user| user.is_active() && user.role().has_minimum(required))
    }

    /// Returns whether the actor may manage accounts holding `target` role.
    #[must_use]
    pub fn can_manage_role(&self, actor: Option<&User>, target: Role) -> bool {
        actor.is_some_and(|actor| actor.is_active() && actor.role().can_manage(target))
    }
}
