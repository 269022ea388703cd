//! Visibility rules: who may see, reveal, create and modify credentials

use super::types::{Acesso, Visibility};
use crate::error::{Result, VaultError};
use crate::user::Principal;

/// Visibility policy
///
/// A credential is visible to its owner, and to administrators when it is
/// `COMPARTILHADA`. `admin_reads_private` additionally lets administrators see
/// other users' `PRIVADA` credentials; it is off unless configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityPolicy {
    pub admin_reads_private: bool,
}

impl VisibilityPolicy {
    pub fn new(admin_reads_private: bool) -> Self {
        Self { admin_reads_private }
    }

    pub fn can_view(&self, requester: &Principal, acesso: &Acesso) -> bool {
        if acesso.owner_id == requester.user_id {
            return true;
        }
        if !requester.is_admin() {
            return false;
        }
        match acesso.visibility {
            Visibility::Compartilhada => true,
            Visibility::Privada => self.admin_reads_private,
        }
    }

    /// Keep only what `requester` may see
    pub fn filter_visible<'a, I>(&self, requester: &Principal, acessos: I) -> Vec<&'a Acesso>
    where
        I: IntoIterator<Item = &'a Acesso>,
    {
        acessos
            .into_iter()
            .filter(|a| self.can_view(requester, a))
            .collect()
    }

    /// Error out unless `requester` may see `acesso`
    pub fn check_view(&self, requester: &Principal, acesso: &Acesso) -> Result<()> {
        if self.can_view(requester, acesso) {
            Ok(())
        } else {
            Err(VaultError::forbidden(
                "You do not have permission to view this credential.",
            ))
        }
    }

    /// Only administrators may create shared credentials
    pub fn check_create(&self, requester: &Principal, visibility: Visibility) -> Result<()> {
        if visibility == Visibility::Compartilhada && !requester.is_admin() {
            return Err(VaultError::forbidden(
                "Only administrators can create shared credentials.",
            ));
        }
        Ok(())
    }

    /// Delete and update: the requester must see it and be its owner or an administrator
    pub fn check_modify(&self, requester: &Principal, acesso: &Acesso) -> Result<()> {
        let allowed = self.can_view(requester, acesso)
            && (acesso.owner_id == requester.user_id || requester.is_admin());
        if allowed {
            Ok(())
        } else {
            Err(VaultError::forbidden(
                "You do not have permission to modify this credential.",
            ))
        }
    }

    /// Only administrators may turn a credential into a shared one
    pub fn check_visibility_change(
        &self,
        requester: &Principal,
        current: Visibility,
        requested: Visibility,
    ) -> Result<()> {
        if requested == Visibility::Compartilhada
            && current != Visibility::Compartilhada
            && !requester.is_admin()
        {
            return Err(VaultError::forbidden(
                "Only administrators can make a credential shared.",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::Role;
    use chrono::Utc;

    fn principal(id: u64, role: Role) -> Principal {
        Principal {
            user_id: id,
            name: format!("user-{}", id),
            email: format!("user{}@example.com", id),
            role,
        }
    }

    fn acesso(id: u64, owner: u64, visibility: Visibility) -> Acesso {
        Acesso {
            id,
            title: format!("acesso-{}", id),
            description: None,
            url: "https://example.com".to_string(),
            login: "root".to_string(),
            visibility,
            owner_id: owner,
            expires_on: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Every owner/role/visibility combination against the visibility rule
    #[test]
    fn test_visibility_rule_exhaustive() {
        let policy = VisibilityPolicy::default();
        let requesters = [
            principal(1, Role::User),
            principal(2, Role::User),
            principal(3, Role::Admin),
            principal(4, Role::Admin),
        ];
        let mut id = 0;
        for owner in 1..=4 {
            for visibility in [Visibility::Privada, Visibility::Compartilhada] {
                id += 1;
                let a = acesso(id, owner, visibility);
                for r in &requesters {
                    let expected = a.owner_id == r.user_id
                        || (r.is_admin() && visibility == Visibility::Compartilhada);
                    assert_eq!(policy.can_view(r, &a), expected, "{:?} / {:?}", r, a);
                }
            }
        }
    }

    #[test]
    fn test_admin_private_override_is_opt_in() {
        let admin = principal(9, Role::Admin);
        let private = acesso(1, 1, Visibility::Privada);

        assert!(!VisibilityPolicy::default().can_view(&admin, &private));
        assert!(VisibilityPolicy::new(true).can_view(&admin, &private));
        assert!(!VisibilityPolicy::new(true).can_view(&principal(2, Role::User), &private));
    }

    #[test]
    fn test_filter_visible() {
        let policy = VisibilityPolicy::default();
        let all = vec![
            acesso(1, 1, Visibility::Privada),
            acesso(2, 2, Visibility::Privada),
            acesso(3, 3, Visibility::Compartilhada),
        ];

        let ids = |r: &Principal| -> Vec<u64> {
            policy.filter_visible(r, &all).iter().map(|a| a.id).collect()
        };
        assert_eq!(ids(&principal(1, Role::User)), vec![1]);
        assert_eq!(ids(&principal(4, Role::Admin)), vec![3]);
        assert_eq!(ids(&principal(3, Role::Admin)), vec![3]);
    }

    #[test]
    fn test_create_rules() {
        let policy = VisibilityPolicy::default();
        let user = principal(1, Role::User);
        let admin = principal(2, Role::Admin);

        assert!(policy.check_create(&user, Visibility::Privada).is_ok());
        assert!(matches!(
            policy.check_create(&user, Visibility::Compartilhada),
            Err(VaultError::Forbidden(_))
        ));
        assert!(policy.check_create(&admin, Visibility::Compartilhada).is_ok());
    }

    #[test]
    fn test_modify_rules() {
        let policy = VisibilityPolicy::default();
        let shared = acesso(1, 3, Visibility::Compartilhada);
        let private = acesso(2, 1, Visibility::Privada);

        assert!(policy.check_modify(&principal(4, Role::Admin), &shared).is_ok());
        assert!(policy.check_modify(&principal(1, Role::User), &shared).is_err());
        assert!(policy.check_modify(&principal(1, Role::User), &private).is_ok());
        assert!(policy.check_modify(&principal(4, Role::Admin), &private).is_err());
    }

    #[test]
    fn test_visibility_change_rules() {
        let policy = VisibilityPolicy::default();
        let user = principal(1, Role::User);

        assert!(policy
            .check_visibility_change(&user, Visibility::Privada, Visibility::Compartilhada)
            .is_err());
        assert!(policy
            .check_visibility_change(&user, Visibility::Compartilhada, Visibility::Compartilhada)
            .is_ok());
        assert!(policy
            .check_visibility_change(&user, Visibility::Compartilhada, Visibility::Privada)
            .is_ok());
    }
}
