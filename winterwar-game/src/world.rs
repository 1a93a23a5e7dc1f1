//! World map nodes and kingdoms.
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Kingdom {
    Valgard,
    Aethelgard,
    Sarrin,
    Fyrod,
}

impl Kingdom {
    pub const ALL: [Self; 4] = [Self::Valgard, Self::Aethelgard, Self::Sarrin, Self::Fyrod];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Valgard => "Ice Kingdom of Valgard",
            Self::Aethelgard => "Aethelgard Empire",
            Self::Sarrin => "Sand Sultanate of Sarrin",
            Self::Fyrod => "Ancient Union of Fyrod",
        }
    }
}

impl fmt::Display for Kingdom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Who holds a map node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Allegiance {
    Kingdom(Kingdom),
    Neutral,
    Bandits,
}

impl Allegiance {
    #[must_use]
    pub const fn kingdom(self) -> Option<Kingdom> {
        match self {
            Self::Kingdom(kingdom) => Some(kingdom),
            Self::Neutral | Self::Bandits => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Town,
    Village,
    Castle,
    Ruin,
    Hideout,
    MountainPass,
}

impl NodeType {
    /// Towns and castles host a market and barracks.
    #[must_use]
    pub const fn has_commerce(self) -> bool {
        matches!(self, Self::Town | Self::Castle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapNode {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub x: f64,
    pub y: f64,
    pub allegiance: Allegiance,
    pub description: &'static str,
}

impl MapNode {
    /// Straight-line distance in map units.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

const MAP_NODES: [MapNode; 9] = [
    node(
        "n1",
        "Frosthold",
        NodeType::Town,
        20.0,
        20.0,
        Allegiance::Kingdom(Kingdom::Valgard),
        "Capital of the north.",
    ),
    node(
        "n2",
        "Iron Fang",
        NodeType::Castle,
        35.0,
        15.0,
        Allegiance::Kingdom(Kingdom::Valgard),
        "Border fortress.",
    ),
    node(
        "n3",
        "Wolfden",
        NodeType::Village,
        10.0,
        30.0,
        Allegiance::Kingdom(Kingdom::Valgard),
        "Mountain village.",
    ),
    node(
        "n4",
        "Sanctum",
        NodeType::Town,
        50.0,
        50.0,
        Allegiance::Kingdom(Kingdom::Aethelgard),
        "The golden city.",
    ),
    node(
        "n5",
        "The Old Mine",
        NodeType::Hideout,
        42.0,
        42.0,
        Allegiance::Bandits,
        "Abandoned.",
    ),
    node(
        "n6",
        "Al-Miraj",
        NodeType::Town,
        80.0,
        80.0,
        Allegiance::Kingdom(Kingdom::Sarrin),
        "Pearl of the desert.",
    ),
    node(
        "n7",
        "Sylvaris",
        NodeType::Town,
        70.0,
        30.0,
        Allegiance::Kingdom(Kingdom::Fyrod),
        "City in the forest.",
    ),
    node(
        "n8",
        "Last Keep",
        NodeType::Castle,
        25.0,
        5.0,
        Allegiance::Kingdom(Kingdom::Valgard),
        "The end of the world.",
    ),
    node(
        "n14",
        "Scorpion Nest",
        NodeType::Hideout,
        85.0,
        15.0,
        Allegiance::Bandits,
        "A bandit den.",
    ),
];

const fn node(
    id: &'static str,
    name: &'static str,
    node_type: NodeType,
    x: f64,
    y: f64,
    allegiance: Allegiance,
    description: &'static str,
) -> MapNode {
    MapNode {
        id,
        name,
        node_type,
        x,
        y,
        allegiance,
        description,
    }
}

/// All nodes on the world map.
#[must_use]
pub const fn map_nodes() -> &'static [MapNode] {
    &MAP_NODES
}

/// Look up a node by id.
#[must_use]
pub fn find_node(node_id: &str) -> Option<&'static MapNode> {
    MAP_NODES.iter().find(|node| node.id == node_id)
}
