use borsh::{BorshDeserialize, BorshSerialize};
use quorum_hasher::{Hasher, Poseidon};

use crate::{
    codec::{pack, ActionFields},
    errors::ActionError,
};

/// Opaque payload element: a point coordinate or field element produced by
/// the cryptographic oracle.
pub type Element = [u8; 32];

#[derive(Clone, Debug, PartialEq, Eq, Copy)]
#[repr(u8)]
pub enum ActionKind {
    CreateGroup = 0,
    JoinGroup = 1,
    LeaveGroup = 2,
    SubmitContribution = 3,
    DeprecateKey = 4,
    CreateRequest = 5,
    ResolveRequest = 6,
}

impl TryFrom<u64> for ActionKind {
    type Error = ActionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ActionKind::CreateGroup),
            1 => Ok(ActionKind::JoinGroup),
            2 => Ok(ActionKind::LeaveGroup),
            3 => Ok(ActionKind::SubmitContribution),
            4 => Ok(ActionKind::DeprecateKey),
            5 => Ok(ActionKind::CreateRequest),
            6 => Ok(ActionKind::ResolveRequest),
            _ => Err(ActionError::UnknownActionKind(value)),
        }
    }
}

/// One dispatched protocol intent. Immutable once appended to the log and
/// identified by its chain position, not its content.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Action {
    CreateGroup {
        group_index: u16,
        threshold: u8,
        size: u8,
    },
    JoinGroup {
        group_index: u16,
        member_index: u16,
        public_key: [Element; 2],
    },
    LeaveGroup {
        group_index: u16,
        member_index: u16,
        public_key: [Element; 2],
    },
    SubmitContribution {
        group_index: u16,
        member_index: u16,
        commitment: [Element; 2],
    },
    DeprecateKey {
        group_index: u16,
    },
    CreateRequest {
        request_index: u16,
        group_index: u16,
        accumulator: [Element; 2],
    },
    ResolveRequest {
        request_index: u16,
        group_index: u16,
        accumulator: [Element; 2],
        response: [Element; 2],
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::CreateGroup { .. } => ActionKind::CreateGroup,
            Action::JoinGroup { .. } => ActionKind::JoinGroup,
            Action::LeaveGroup { .. } => ActionKind::LeaveGroup,
            Action::SubmitContribution { .. } => ActionKind::SubmitContribution,
            Action::DeprecateKey { .. } => ActionKind::DeprecateKey,
            Action::CreateRequest { .. } => ActionKind::CreateRequest,
            Action::ResolveRequest { .. } => ActionKind::ResolveRequest,
        }
    }

    /// Sub-fields in packed order. `target_index` carries the member index
    /// for membership kinds and the request index for request kinds.
    pub fn fields(&self) -> ActionFields {
        let kind = self.kind() as u64;
        match *self {
            Action::CreateGroup {
                group_index,
                threshold,
                size,
            } => ActionFields {
                kind,
                group_index: group_index as u64,
                threshold: threshold as u64,
                size: size as u64,
                ..Default::default()
            },
            Action::JoinGroup {
                group_index,
                member_index,
                ..
            }
            | Action::LeaveGroup {
                group_index,
                member_index,
                ..
            }
            | Action::SubmitContribution {
                group_index,
                member_index,
                ..
            } => ActionFields {
                kind,
                group_index: group_index as u64,
                target_index: member_index as u64,
                ..Default::default()
            },
            Action::DeprecateKey { group_index } => ActionFields {
                kind,
                group_index: group_index as u64,
                ..Default::default()
            },
            Action::CreateRequest {
                request_index,
                group_index,
                ..
            }
            | Action::ResolveRequest {
                request_index,
                group_index,
                ..
            } => ActionFields {
                kind,
                group_index: group_index as u64,
                target_index: request_index as u64,
                ..Default::default()
            },
        }
    }

    /// Payload elements in declared order, 0 to 4 of them.
    pub fn payload(&self) -> Vec<Element> {
        match self {
            Action::CreateGroup { .. } | Action::DeprecateKey { .. } => vec![],
            Action::JoinGroup { public_key, .. } | Action::LeaveGroup { public_key, .. } => {
                public_key.to_vec()
            }
            Action::SubmitContribution { commitment, .. } => commitment.to_vec(),
            Action::CreateRequest { accumulator, .. } => accumulator.to_vec(),
            Action::ResolveRequest {
                accumulator,
                response,
                ..
            } => {
                let mut payload = accumulator.to_vec();
                payload.extend_from_slice(response);
                payload
            }
        }
    }

    pub fn packed_word(&self) -> Result<[u8; 32], ActionError> {
        pack(&self.fields())
    }

    /// Chain-extension unit: hash of the flattened (packed word, payload)
    /// tuple.
    pub fn hash(&self) -> Result<[u8; 32], ActionError> {
        let word = self.packed_word()?;
        let payload = self.payload();
        let mut inputs: Vec<&[u8]> = Vec::with_capacity(1 + payload.len());
        inputs.push(&word);
        for element in payload.iter() {
            inputs.push(element);
        }
        Ok(Poseidon::hashv(&inputs)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::unpack;

    #[test]
    fn test_fields_round_trip_through_packed_word() {
        let action = Action::SubmitContribution {
            group_index: 3,
            member_index: 11,
            commitment: [[5u8; 32], [6u8; 32]],
        };
        let word = action.packed_word().unwrap();
        let fields = unpack(&word).unwrap();
        assert_eq!(fields, action.fields());
        assert_eq!(
            ActionKind::try_from(fields.kind).unwrap(),
            ActionKind::SubmitContribution
        );
    }

    #[test]
    fn test_hash_depends_on_payload() {
        let a = Action::JoinGroup {
            group_index: 1,
            member_index: 2,
            public_key: [[1u8; 32], [2u8; 32]],
        };
        let b = Action::JoinGroup {
            group_index: 1,
            member_index: 2,
            public_key: [[1u8; 32], [3u8; 32]],
        };
        assert_ne!(a.hash().unwrap(), b.hash().unwrap());
    }

    #[test]
    fn test_hash_depends_on_kind() {
        let join = Action::JoinGroup {
            group_index: 1,
            member_index: 2,
            public_key: [[1u8; 32], [2u8; 32]],
        };
        let leave = Action::LeaveGroup {
            group_index: 1,
            member_index: 2,
            public_key: [[1u8; 32], [2u8; 32]],
        };
        assert_ne!(join.hash().unwrap(), leave.hash().unwrap());
    }

    #[test]
    fn test_unknown_kind_tag_is_rejected() {
        assert_eq!(
            ActionKind::try_from(7),
            Err(ActionError::UnknownActionKind(7))
        );
    }
}
