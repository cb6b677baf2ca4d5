use masthead_domain::Role;

use super::*;

impl PermissionService {
    /// Returns whether the actor may delete the account `target`.
    ///
    /// Self-deletion is always denied, even for administrators holding the
    /// blanket manage grant.
    pub async fn can_delete_user(&self, actor: Option<&User>, target: &UserId) -> bool {
        let Some(actor) = actor else {
            return false;
        };

        if actor.id() == target {
            return false;
        }

        self.has_resource_access(Some(actor), Resource::Users, Action::Delete, None)
            .await
    }

    /// Returns whether the actor may change `target`'s role to `new_role`.
    ///
    /// Self-modification is always denied, and the actor cannot assign a
    /// role above their own level.
    pub async fn can_change_user_role(
        &self,
        actor: Option<&User>,
        target: &UserId,
        new_role: Role,
    ) -> bool {
        let Some(actor) = actor else {
            return false;
        };

        if actor.id() == target {
            return false;
        }

        if actor.role().level() < new_role.level() {
            return false;
        }

        self.has_resource_access(Some(actor), Resource::Users, Action::Update, None)
            .await
    }

    /// Returns the subset of `items` the user may act on, in input order.
    ///
    /// Items are checked sequentially; listings are small and the per-item
    /// check is a cache hit in the common case.
    pub async fn filter_by_permissions<T, F>(
        &self,
        user: Option<&User>,
        items: Vec<T>,
        resource_for: F,
        action: Action,
    ) -> Vec<T>
    where
        F: Fn(&T) -> Resource,
    {
        let Some(user) = user else {
            return Vec::new();
        };

        let mut allowed = Vec::new();
        for item in items {
            if self
                .has_resource_access(Some(user), resource_for(&item), action, None)
                .await
            {
                allowed.push(item);
            }
        }

        allowed
    }
}
