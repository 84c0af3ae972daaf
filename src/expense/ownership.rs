//! Controls whether users may change expenses they do not own.

use crate::auth::UserID;

/// Whether edits and deletes are limited to the owner of an expense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OwnershipPolicy {
    /// Lookups by ID only match the caller's own expenses. Another user's
    /// expense behaves exactly like a missing one.
    #[default]
    Enforce,
    /// Any authenticated user may view, edit or delete any expense by ID.
    Unrestricted,
}

impl OwnershipPolicy {
    /// The owner that ID based lookups should be limited to, if any.
    pub fn scope(self, user_id: UserID) -> Option<UserID> {
        match self {
            OwnershipPolicy::Enforce => Some(user_id),
            OwnershipPolicy::Unrestricted => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::UserID;

    use super::OwnershipPolicy;

    #[test]
    fn enforce_scopes_to_caller() {
        assert_eq!(
            OwnershipPolicy::Enforce.scope(UserID::new(7)),
            Some(UserID::new(7))
        );
    }

    #[test]
    fn unrestricted_has_no_scope() {
        assert_eq!(OwnershipPolicy::Unrestricted.scope(UserID::new(7)), None);
    }
}
