//! # Queue Item Status and Transition Table
//!
//! ```text
//! NameRegister:
//!   Initial ──commit sent──→ CommitSent ──mined──→ CommitDone ──register sent──→ RegisterSent ──mined──→ Completed
//!      │                        │                     │                              │
//!      └──────→ CommitError ←───┘                     └──→ RegisterError             └──→ Error
//!
//! NameRenew:
//!   Initial ──renew sent──→ RenewSent ──mined──→ Completed
//!      │                        │
//!      └──────→ RenewError ←────┘
//! ```
//!
//! Terminal states never transition again. A status that does not belong to
//! the item's type fails into `Error`.

use std::fmt;

use serde::{Deserialize, Serialize};
use shared_types::OperationState;

use crate::domain::entities::ItemType;

/// Fine-grained, persisted status of a queue item.
///
/// Variant order is part of the stored encoding: append only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueueItemStatus {
    /// No transaction sent yet.
    Initial,
    /// Commit transaction submitted, awaiting mining.
    CommitSent,
    /// Commit mined, register transaction not yet sent.
    CommitDone,
    /// Register transaction submitted, awaiting mining.
    RegisterSent,
    /// Terminal success.
    Completed,
    /// Terminal failure in the commit phase.
    CommitError,
    /// Terminal failure submitting the register transaction.
    RegisterError,
    /// Terminal failure after the register transaction, or an invalid state.
    Error,
    /// Renew transaction submitted, awaiting mining.
    RenewSent,
    /// Terminal failure in the renew phase.
    RenewError,
}

/// Non-terminal buckets visited by the startup resume scan, in order.
pub const RESUME_BUCKETS: [QueueItemStatus; 5] = [
    QueueItemStatus::Initial,
    QueueItemStatus::CommitSent,
    QueueItemStatus::CommitDone,
    QueueItemStatus::RegisterSent,
    QueueItemStatus::RenewSent,
];

impl QueueItemStatus {
    /// Returns true for `Completed` and every error state.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            QueueItemStatus::Completed
                | QueueItemStatus::CommitError
                | QueueItemStatus::RegisterError
                | QueueItemStatus::Error
                | QueueItemStatus::RenewError
        )
    }

    /// Returns true if the status is valid for items of `item_type`.
    pub fn belongs_to(self, item_type: ItemType) -> bool {
        use QueueItemStatus::*;
        match item_type {
            ItemType::NameRegister => !matches!(self, RenewSent | RenewError),
            ItemType::NameRenew => matches!(
                self,
                Initial | RenewSent | Completed | RenewError | Error
            ),
        }
    }

    /// Status reached when the step for `self` succeeds.
    ///
    /// `None` for terminal states and for statuses foreign to `item_type`.
    pub fn on_success(self, item_type: ItemType) -> Option<QueueItemStatus> {
        use QueueItemStatus::*;
        match (item_type, self) {
            (ItemType::NameRegister, Initial) => Some(CommitSent),
            (ItemType::NameRegister, CommitSent) => Some(CommitDone),
            (ItemType::NameRegister, CommitDone) => Some(RegisterSent),
            (ItemType::NameRegister, RegisterSent) => Some(Completed),
            (ItemType::NameRenew, Initial) => Some(RenewSent),
            (ItemType::NameRenew, RenewSent) => Some(Completed),
            _ => None,
        }
    }

    /// Status reached when the step for `self` fails.
    ///
    /// Terminal states map to themselves.
    pub fn on_failure(self, item_type: ItemType) -> QueueItemStatus {
        use QueueItemStatus::*;
        if self.is_terminal() {
            return self;
        }
        match (item_type, self) {
            (ItemType::NameRegister, Initial | CommitSent) => CommitError,
            (ItemType::NameRegister, CommitDone) => RegisterError,
            (ItemType::NameRenew, Initial | RenewSent) => RenewError,
            _ => Error,
        }
    }

    /// Coarse state reported to clients.
    pub fn to_operation_state(self) -> OperationState {
        use QueueItemStatus::*;
        match self {
            Initial | CommitSent | CommitDone | RegisterSent | RenewSent => {
                OperationState::Pending
            }
            Completed => OperationState::Completed,
            CommitError | RegisterError | Error | RenewError => OperationState::Error,
        }
    }
}

impl fmt::Display for QueueItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueueItemStatus::Initial => "INITIAL",
            QueueItemStatus::CommitSent => "COMMIT_SENT",
            QueueItemStatus::CommitDone => "COMMIT_DONE",
            QueueItemStatus::RegisterSent => "REGISTER_SENT",
            QueueItemStatus::Completed => "COMPLETED",
            QueueItemStatus::CommitError => "COMMIT_ERROR",
            QueueItemStatus::RegisterError => "REGISTER_ERROR",
            QueueItemStatus::Error => "ERROR",
            QueueItemStatus::RenewSent => "RENEW_SENT",
            QueueItemStatus::RenewError => "RENEW_ERROR",
        };
        f.write_str(name)
    }
}

/// Whether the driving loop halts after reaching `status`.
///
/// A failed step always halts, whatever status it mapped to.
pub fn is_stop_processing(status: QueueItemStatus, step_failed: bool) -> bool {
    step_failed || status.is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use QueueItemStatus::*;

    const ALL: [QueueItemStatus; 10] = [
        Initial,
        CommitSent,
        CommitDone,
        RegisterSent,
        Completed,
        CommitError,
        RegisterError,
        Error,
        RenewSent,
        RenewError,
    ];

    #[test]
    fn test_register_happy_path() {
        let mut status = Initial;
        let mut seen = vec![status];
        while let Some(next) = status.on_success(ItemType::NameRegister) {
            status = next;
            seen.push(status);
        }
        assert_eq!(
            seen,
            vec![Initial, CommitSent, CommitDone, RegisterSent, Completed]
        );
    }

    #[test]
    fn test_renew_happy_path() {
        assert_eq!(Initial.on_success(ItemType::NameRenew), Some(RenewSent));
        assert_eq!(RenewSent.on_success(ItemType::NameRenew), Some(Completed));
        assert_eq!(CommitSent.on_success(ItemType::NameRenew), None);
    }

    #[test]
    fn test_register_failure_targets() {
        assert_eq!(Initial.on_failure(ItemType::NameRegister), CommitError);
        assert_eq!(CommitSent.on_failure(ItemType::NameRegister), CommitError);
        assert_eq!(CommitDone.on_failure(ItemType::NameRegister), RegisterError);
        assert_eq!(RegisterSent.on_failure(ItemType::NameRegister), Error);
    }

    #[test]
    fn test_foreign_status_fails_into_error() {
        assert_eq!(RenewSent.on_failure(ItemType::NameRegister), Error);
        assert_eq!(CommitDone.on_failure(ItemType::NameRenew), Error);
        assert!(!RenewSent.belongs_to(ItemType::NameRegister));
        assert!(!CommitSent.belongs_to(ItemType::NameRenew));
    }

    #[test]
    fn test_terminal_states_are_fixed_points() {
        for status in ALL.into_iter().filter(|s| s.is_terminal()) {
            for item_type in [ItemType::NameRegister, ItemType::NameRenew] {
                assert_eq!(status.on_success(item_type), None);
                assert_eq!(status.on_failure(item_type), status);
            }
            assert!(is_stop_processing(status, false));
        }
    }

    #[test]
    fn test_operation_state_mapping() {
        for status in ALL {
            let expected = if status == Completed {
                OperationState::Completed
            } else if status.is_terminal() {
                OperationState::Error
            } else {
                OperationState::Pending
            };
            assert_eq!(status.to_operation_state(), expected, "{status}");
        }
    }

    #[test]
    fn test_resume_buckets_cover_every_live_state() {
        for status in ALL {
            assert_eq!(RESUME_BUCKETS.contains(&status), !status.is_terminal());
        }
    }

    #[test]
    fn test_failed_step_always_stops() {
        assert!(is_stop_processing(CommitSent, true));
        assert!(!is_stop_processing(CommitSent, false));
    }
}
