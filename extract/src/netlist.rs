//! Textual netlists.
//!
//! One line per net, listing every transistor terminal on it:
//!
//! ```text
//! GND: q0.e1 q1.e1
//! IN_0: q0.gate
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::str::FromStr;

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::nets::Net;
use crate::transistors::Transistor;

/// A transistor terminal.
#[derive(Debug, Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    /// The gate.
    Gate,
    /// The first electrode.
    E0,
    /// The second electrode.
    E1,
}

impl Terminal {
    /// Returns `true` for either electrode.
    #[inline]
    pub fn is_electrode(&self) -> bool {
        !matches!(self, Self::Gate)
    }
}

impl Display for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gate => write!(f, "gate"),
            Self::E0 => write!(f, "e0"),
            Self::E1 => write!(f, "e1"),
        }
    }
}

impl FromStr for Terminal {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "gate" => Ok(Self::Gate),
            "e0" => Ok(Self::E0),
            "e1" => Ok(Self::E1),
            other => Err(format!("unknown terminal `{other}`")),
        }
    }
}

/// Nets and the transistor terminals on them, in net order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Netlist {
    entries: IndexMap<ArcStr, BTreeSet<(ArcStr, Terminal)>>,
}

impl Netlist {
    /// Builds the netlist of a circuit.
    ///
    /// Nets without terminals are left out. Electrodes beyond the second are
    /// not listed. A net whose name is already taken by an earlier net is
    /// listed as `<name>#<id>`.
    pub fn from_circuit(nets: &[Net], transistors: &[Transistor]) -> Self {
        let mut terminals: BTreeMap<usize, BTreeSet<(ArcStr, Terminal)>> = BTreeMap::new();
        for t in transistors.iter() {
            terminals
                .entry(t.gate.0)
                .or_default()
                .insert((t.name.clone(), Terminal::Gate));
            for (net, terminal) in t.electrodes.iter().zip([Terminal::E0, Terminal::E1]) {
                terminals
                    .entry(net.0)
                    .or_default()
                    .insert((t.name.clone(), terminal));
            }
        }
        let mut entries = IndexMap::new();
        for net in nets.iter() {
            let Some(on_net) = terminals.remove(&net.id.0) else {
                continue;
            };
            let key = if entries.contains_key(&net.name) {
                arcstr::format!("{}#{}", net.name, net.id.0)
            } else {
                net.name.clone()
            };
            entries.insert(key, on_net);
        }
        Self { entries }
    }

    /// Iterates over nets and their terminals.
    pub fn iter(&self) -> impl Iterator<Item = (&ArcStr, &BTreeSet<(ArcStr, Terminal)>)> {
        self.entries.iter()
    }

    /// The terminals on the net called `name`.
    pub fn get(&self, name: &str) -> Option<&BTreeSet<(ArcStr, Terminal)>> {
        self.entries.get(name)
    }

    /// Number of nets listed.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no net is listed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per transistor: gate nets and sorted electrode nets.
    fn connections(&self) -> BTreeMap<&ArcStr, (Vec<&ArcStr>, Vec<&ArcStr>)> {
        let mut out: BTreeMap<&ArcStr, (Vec<&ArcStr>, Vec<&ArcStr>)> = BTreeMap::new();
        for (net, terminals) in self.entries.iter() {
            for (transistor, terminal) in terminals.iter() {
                let entry = out.entry(transistor).or_default();
                if terminal.is_electrode() {
                    entry.1.push(net);
                } else {
                    entry.0.push(net);
                }
            }
        }
        for (gates, electrodes) in out.values_mut() {
            gates.sort();
            electrodes.sort();
        }
        out
    }

    /// Returns `true` if both netlists connect every transistor the same
    /// way, treating the two electrodes of a transistor as interchangeable.
    pub fn is_equivalent(&self, other: &Netlist) -> bool {
        self.connections() == other.connections()
    }
}

impl Display for Netlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (net, terminals) in self.entries.iter() {
            write!(f, "{net}:")?;
            for (transistor, terminal) in terminals.iter() {
                write!(f, " {transistor}.{terminal}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Netlist {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut entries = IndexMap::new();
        for (i, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let err = |message: String| Error::Parse {
                line: i + 1,
                message,
            };
            let (net, rest) = line
                .split_once(':')
                .ok_or_else(|| err("expected `net: terminals`".to_string()))?;
            let net = net.trim();
            if net.is_empty() {
                return Err(err("empty net name".to_string()));
            }
            let mut terminals = BTreeSet::new();
            for item in rest.split_whitespace() {
                let (transistor, terminal) = item
                    .rsplit_once('.')
                    .ok_or_else(|| err(format!("expected `transistor.terminal`, found `{item}`")))?;
                let terminal: Terminal = terminal.parse().map_err(err)?;
                terminals.insert((ArcStr::from(transistor), terminal));
            }
            if entries.insert(ArcStr::from(net), terminals).is_some() {
                return Err(err(format!("net `{net}` listed twice")));
            }
        }
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn display_parse_round_trip() {
        let text = "GND: q0.e1 q1.e1\nIN_0: q0.gate\nOUT: q0.e0 q1.e0 q1.gate\n";
        let netlist: Netlist = text.parse().unwrap();
        assert_eq!(netlist.len(), 3);
        assert_eq!(netlist.to_string(), text);
        assert!(netlist.get("IN_0").unwrap().contains(&(arcstr::literal!("q0"), Terminal::Gate)));
    }

    #[test]
    fn electrodes_are_interchangeable() {
        let a: Netlist = "A: q0.e0\nB: q0.e1\nG: q0.gate\n".parse().unwrap();
        let b: Netlist = "B: q0.e0\nA: q0.e1\nG: q0.gate\n".parse().unwrap();
        let c: Netlist = "A: q0.e0\nG: q0.e1\nB: q0.gate\n".parse().unwrap();
        assert!(a.is_equivalent(&b));
        assert!(!a.is_equivalent(&c));
    }

    #[test]
    fn nets_sharing_a_name_keep_their_terminals() {
        use geometry::prelude::*;

        use crate::nets::{NetClass, NetId};

        let net = |id: usize, name: &str, class: NetClass| Net {
            id: NetId(id),
            name: ArcStr::from(name),
            named: true,
            class,
            pin: false,
            members: Vec::new(),
        };
        let nets = vec![
            net(0, "GND", NetClass::Ground),
            net(1, "OUT", NetClass::Signal),
            net(2, "A", NetClass::Signal),
            net(3, "OUT", NetClass::Signal),
            net(4, "B", NetClass::Signal),
        ];
        let transistor = |name: &str, gate: usize, out: usize| Transistor {
            name: ArcStr::from(name),
            gate: NetId(gate),
            electrodes: vec![NetId(0), NetId(out)],
            region: Polygon::default(),
            complete: true,
            at: Point::zero(),
        };
        let transistors = vec![transistor("q0", 2, 1), transistor("q1", 4, 3)];

        let netlist = Netlist::from_circuit(&nets, &transistors);
        assert_eq!(netlist.len(), 5);
        assert_eq!(
            netlist.get("OUT").unwrap(),
            &BTreeSet::from([(arcstr::literal!("q0"), Terminal::E1)])
        );
        assert_eq!(
            netlist.get("OUT#3").unwrap(),
            &BTreeSet::from([(arcstr::literal!("q1"), Terminal::E1)])
        );
        let parsed: Netlist = netlist.to_string().parse().unwrap();
        assert_eq!(parsed, netlist);
    }

    #[test]
    fn parse_errors_name_the_line() {
        let err = "A: q0.e0\n\nB q0.e1\n".parse::<Netlist>().unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));
        let err = "A: q0.source\n".parse::<Netlist>().unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
        let err = "A: q0.e0\nA: q1.e0\n".parse::<Netlist>().unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }
}
