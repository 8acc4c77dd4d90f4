use crate::{error::ApiError, users::repo::Role};

/// A role-gated operation, as seen by the decision table. Task updates carry
/// whether the requester is the task's assignee, which is the only ownership
/// fact the table consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Any list/get over users, teams or tasks.
    Read,
    CreateTeam,
    UpdateTeam,
    DeleteTeam,
    CreateUser,
    UpdateUser,
    DeleteUser,
    CreateTask,
    UpdateTask { requester_is_assignee: bool },
    DeleteTask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// The write may proceed only if every field except the task status is
    /// unchanged. Granted to an Employee updating a task assigned to them.
    AllowStatusOnly,
    Deny,
}

/// The authorization decision table. Pure: no storage, no transport, no
/// hidden state.
pub fn authorize(role: Role, operation: Operation) -> Decision {
    use Decision::*;
    use Operation::*;

    match (role, operation) {
        (_, Read) => Allow,
        (Role::Admin, _) => Allow,
        (Role::Manage, CreateTask | UpdateTask { .. }) => Allow,
        (
            Role::Employee,
            UpdateTask {
                requester_is_assignee: true,
            },
        ) => AllowStatusOnly,
        _ => Deny,
    }
}

/// Shorthand for operations where only a full `Allow` makes sense; maps a
/// denial to `Forbidden`.
pub fn ensure_allowed(role: Role, operation: Operation) -> Result<(), ApiError> {
    match authorize(role, operation) {
        Decision::Allow => Ok(()),
        _ => Err(ApiError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::Decision::*;
    use super::Operation::*;
    use super::*;

    const ROLES: [Role; 3] = [Role::Admin, Role::Manage, Role::Employee];

    #[test]
    fn reads_are_open_to_every_role() {
        for role in ROLES {
            assert_eq!(authorize(role, Read), Allow, "{role:?}");
        }
    }

    #[test]
    fn team_writes_are_admin_only() {
        for op in [CreateTeam, UpdateTeam, DeleteTeam] {
            assert_eq!(authorize(Role::Admin, op), Allow, "{op:?}");
            assert_eq!(authorize(Role::Manage, op), Deny, "{op:?}");
            assert_eq!(authorize(Role::Employee, op), Deny, "{op:?}");
        }
    }

    #[test]
    fn user_writes_are_admin_only() {
        for op in [CreateUser, UpdateUser, DeleteUser] {
            assert_eq!(authorize(Role::Admin, op), Allow, "{op:?}");
            assert_eq!(authorize(Role::Manage, op), Deny, "{op:?}");
            assert_eq!(authorize(Role::Employee, op), Deny, "{op:?}");
        }
    }

    #[test]
    fn task_creation_needs_manage_or_admin() {
        assert_eq!(authorize(Role::Admin, CreateTask), Allow);
        assert_eq!(authorize(Role::Manage, CreateTask), Allow);
        assert_eq!(authorize(Role::Employee, CreateTask), Deny);
    }

    #[test]
    fn task_update_full_for_admin_and_manage_regardless_of_assignment() {
        for assigned in [true, false] {
            let op = UpdateTask {
                requester_is_assignee: assigned,
            };
            assert_eq!(authorize(Role::Admin, op), Allow);
            assert_eq!(authorize(Role::Manage, op), Allow);
        }
    }

    #[test]
    fn assigned_employee_may_only_touch_status() {
        assert_eq!(
            authorize(
                Role::Employee,
                UpdateTask {
                    requester_is_assignee: true
                }
            ),
            AllowStatusOnly
        );
    }

    #[test]
    fn unassigned_employee_may_not_update() {
        assert_eq!(
            authorize(
                Role::Employee,
                UpdateTask {
                    requester_is_assignee: false
                }
            ),
            Deny
        );
    }

    #[test]
    fn task_deletion_is_admin_only() {
        assert_eq!(authorize(Role::Admin, DeleteTask), Allow);
        assert_eq!(authorize(Role::Manage, DeleteTask), Deny);
        assert_eq!(authorize(Role::Employee, DeleteTask), Deny);
    }

    #[test]
    fn ensure_allowed_maps_denial_to_forbidden() {
        assert!(ensure_allowed(Role::Admin, DeleteTask).is_ok());
        assert!(matches!(
            ensure_allowed(Role::Employee, CreateTask),
            Err(ApiError::Forbidden)
        ));
        // A status-only grant is not a full allow.
        assert!(matches!(
            ensure_allowed(
                Role::Employee,
                UpdateTask {
                    requester_is_assignee: true
                }
            ),
            Err(ApiError::Forbidden)
        ));
    }
}
