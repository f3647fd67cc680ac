//! Logical transistor groups: parallel transistors merged for recognition.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::nets::{Net, NetClass, NetId};
use crate::transistors::Transistor;

/// A transistor terminal as seen by the recognizer.
///
/// Every power net is one node, and so is every ground net.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Node {
    /// A signal net.
    Net(NetId),
    /// Any power rail.
    Power,
    /// Any ground rail.
    Ground,
}

impl Node {
    /// The node for `net`.
    pub fn of(net: &Net) -> Self {
        match net.class {
            NetClass::Power => Self::Power,
            NetClass::Ground => Self::Ground,
            NetClass::Signal | NetClass::Unassigned => Self::Net(net.id),
        }
    }

    /// The signal net, if this is not a rail.
    #[inline]
    pub fn net(&self) -> Option<NetId> {
        match self {
            Self::Net(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns `true` for the power and ground nodes.
    #[inline]
    pub fn is_rail(&self) -> bool {
        !matches!(self, Self::Net(_))
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Net(id) => write!(f, "{id}"),
            Self::Power => write!(f, "POWER"),
            Self::Ground => write!(f, "GROUND"),
        }
    }
}

/// Identifies a [`Group`].
#[derive(
    Debug, Copy, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct GroupId(pub usize);

/// Transistors with the same gate between the same two nodes.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// The group's identifier.
    pub id: GroupId,
    /// The shared gate net.
    pub gate: NetId,
    /// The two electrode nodes, ascending.
    pub ends: [Node; 2],
    /// A concrete net for each end, taken from the first member.
    pub nets: [NetId; 2],
    /// Indices of the member transistors, ascending.
    pub transistors: Vec<usize>,
}

impl Group {
    /// Returns `true` if either end is `node`.
    #[inline]
    pub fn touches(&self, node: Node) -> bool {
        self.ends.contains(&node)
    }

    /// The end opposite `node`, if `node` is an end.
    pub fn other(&self, node: Node) -> Option<Node> {
        match self.ends {
            [a, b] if a == node => Some(b),
            [a, b] if b == node => Some(a),
            _ => None,
        }
    }

    /// The concrete net at the end opposite `node`.
    pub fn other_net(&self, node: Node) -> Option<NetId> {
        match self.ends {
            [a, _] if a == node => Some(self.nets[1]),
            [_, b] if b == node => Some(self.nets[0]),
            _ => None,
        }
    }

    /// Returns `true` if one end is on power.
    #[inline]
    pub fn is_powered(&self) -> bool {
        self.touches(Node::Power)
    }

    /// Returns `true` if one end is on ground.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.touches(Node::Ground)
    }
}

/// Merges complete transistors into groups.
///
/// Two transistors share a group when their gates are the same net and
/// their electrodes meet the same two nodes, in either order. Incomplete
/// transistors take no part.
pub fn merge_transistors(nets: &[Net], transistors: &[Transistor]) -> Vec<Group> {
    let node = |id: NetId| nets.get(id.0).map(Node::of).unwrap_or(Node::Net(id));

    let mut merged: BTreeMap<(NetId, [Node; 2]), (Vec<usize>, [NetId; 2])> = BTreeMap::new();
    for (i, t) in transistors.iter().enumerate() {
        let Some([a, b]) = t.ends() else { continue };
        let (ends, pair) = if node(a) <= node(b) {
            ([node(a), node(b)], [a, b])
        } else {
            ([node(b), node(a)], [b, a])
        };
        merged
            .entry((t.gate, ends))
            .or_insert_with(|| (Vec::new(), pair))
            .0
            .push(i);
    }

    let groups: Vec<Group> = merged
        .into_iter()
        .enumerate()
        .map(|(id, ((gate, ends), (transistors, nets)))| Group {
            id: GroupId(id),
            gate,
            ends,
            nets,
            transistors,
        })
        .collect();
    tracing::debug!(
        transistors = transistors.len(),
        groups = groups.len(),
        "transistors merged"
    );
    groups
}
