// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed keys for arena storage.
//!
//! Keys are generational slotmap indices: a key stays valid (or reliably
//! invalid) even after other entities are removed.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a vertex (point with a tolerance).
    pub struct VertexKey;

    /// Key for a straight edge between two vertices.
    pub struct EdgeKey;

    /// Key for a wire (oriented chain of edges).
    pub struct WireKey;

    /// Key for a planar face bounded by wires.
    pub struct FaceKey;

    /// Key for a shell (set of faces).
    pub struct ShellKey;

    /// Key for a solid bounded by shells.
    pub struct SolidKey;

    /// Key for a compound of solids.
    pub struct CompSolidKey;
}

/// A key that can reference any kernel entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopologyKey {
    Vertex(VertexKey),
    Edge(EdgeKey),
    Wire(WireKey),
    Face(FaceKey),
    Shell(ShellKey),
    Solid(SolidKey),
    CompSolid(CompSolidKey),
}

impl TopologyKey {
    pub fn topology_type(&self) -> TopologyType {
        match self {
            TopologyKey::Vertex(_) => TopologyType::Vertex,
            TopologyKey::Edge(_) => TopologyType::Edge,
            TopologyKey::Wire(_) => TopologyType::Wire,
            TopologyKey::Face(_) => TopologyType::Face,
            TopologyKey::Shell(_) => TopologyType::Shell,
            TopologyKey::Solid(_) => TopologyType::Solid,
            TopologyKey::CompSolid(_) => TopologyType::CompSolid,
        }
    }
}

/// Discriminant for kernel entity types, ordered by dimension of nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TopologyType {
    Vertex = 0,
    Edge = 1,
    Wire = 2,
    Face = 3,
    Shell = 4,
    Solid = 5,
    CompSolid = 6,
}

impl TopologyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopologyType::Vertex => "Vertex",
            TopologyType::Edge => "Edge",
            TopologyType::Wire => "Wire",
            TopologyType::Face => "Face",
            TopologyType::Shell => "Shell",
            TopologyType::Solid => "Solid",
            TopologyType::CompSolid => "CompSolid",
        }
    }
}

impl std::fmt::Display for TopologyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! impl_from_key {
    ($($key:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$key> for TopologyKey {
                fn from(k: $key) -> Self {
                    TopologyKey::$variant(k)
                }
            }
        )*
    };
}

impl_from_key! {
    VertexKey => Vertex,
    EdgeKey => Edge,
    WireKey => Wire,
    FaceKey => Face,
    ShellKey => Shell,
    SolidKey => Solid,
    CompSolidKey => CompSolid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn type_names_follow_nesting_order() {
        assert_eq!(TopologyType::CompSolid.to_string(), "CompSolid");
        assert!(TopologyType::Edge < TopologyType::Wire);
        assert!(TopologyType::Shell < TopologyType::Solid);
    }

    #[test]
    fn keys_convert_into_topology_key() {
        let mut wires: SlotMap<WireKey, ()> = SlotMap::with_key();
        let wk = wires.insert(());
        let key: TopologyKey = wk.into();
        assert_eq!(key.topology_type(), TopologyType::Wire);
        assert_eq!(key, TopologyKey::Wire(wk));
    }
}
