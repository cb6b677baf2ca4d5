use masthead_domain::{HttpMethod, PermissionRequirementMode};

use super::*;

impl PermissionService {
    /// Returns whether the user may access the route, requiring any single
    /// one of the route's permissions.
    pub async fn can_access_route(
        &self,
        user: Option<&User>,
        path: &str,
        method: HttpMethod,
    ) -> bool {
        self.can_access_route_with_mode(user, path, method, PermissionRequirementMode::Any)
            .await
    }

    /// Returns whether the user may access the route under the given
    /// permission combination mode.
    ///
    /// Public-prefix routes are exempt from all checks, including
    /// authentication. Routes without configured permissions admit any
    /// active authenticated user; whether anonymous requests may pass such
    /// routes is the upstream middleware's concern.
    pub async fn can_access_route_with_mode(
        &self,
        user: Option<&User>,
        path: &str,
        method: HttpMethod,
        mode: PermissionRequirementMode,
    ) -> bool {
        if self.routes.is_public(path) {
            return true;
        }

        let Some(user) = user else {
            return false;
        };

        if !user.is_active() {
            return false;
        }

        let required = self.routes.required_permissions(path, method);
        if required.is_empty() {
            return true;
        }

        match mode {
            PermissionRequirementMode::Any => {
                for permission in required {
                    if self.has_permission(Some(user), permission).await {
                        return true;
                    }
                }
                false
            }
            PermissionRequirementMode::All => {
                for permission in required {
                    if !self.has_permission(Some(user), permission).await {
                        return false;
                    }
                }
                true
            }
        }
    }
}
