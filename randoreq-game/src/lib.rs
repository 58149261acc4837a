pub mod state;

use anyhow::{Context, Result};
use hashbrown::HashMap;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumString, VariantNames};
use thiserror::Error;

pub use crate::state::ResourceState;

pub type ResourceIndex = usize; // Index assigned when the game definition is built (only unique within a category)
pub type Amount = i32; // Quantity of a resource owned by the player, or demanded by a requirement

// Reserved `misc` resources, by convention of the game definitions:
pub const TRIVIAL_RESOURCE_INDEX: ResourceIndex = 0;
pub const IMPOSSIBLE_RESOURCE_INDEX: ResourceIndex = 1;

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    VariantNames,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[repr(usize)]
pub enum ResourceType {
    Item,        // 0
    Event,       // 1
    Trick,       // 2
    Damage,      // 3
    Version,     // 4
    Misc,        // 5
    Difficulty,  // 6
    PickupIndex, // 7
}

impl ResourceType {
    pub const ALL: [ResourceType; 8] = [
        ResourceType::Item,
        ResourceType::Event,
        ResourceType::Trick,
        ResourceType::Damage,
        ResourceType::Version,
        ResourceType::Misc,
        ResourceType::Difficulty,
        ResourceType::PickupIndex,
    ];
}

/// Identity of a resource: the category is part of it, so `misc` index 0 and `item` index 0
/// are different resources.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    pub kind: ResourceType,
    pub index: ResourceIndex,
}

impl ResourceKey {
    pub fn new(kind: ResourceType, index: ResourceIndex) -> Self {
        ResourceKey { kind, index }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.index)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleResourceInfo {
    pub index: ResourceIndex,
    pub long_name: String,
    pub short_name: String,
}

impl SimpleResourceInfo {
    pub fn new(index: ResourceIndex, long_name: &str, short_name: &str) -> Self {
        SimpleResourceInfo {
            index,
            long_name: long_name.to_owned(),
            short_name: short_name.to_owned(),
        }
    }

    pub fn key(&self, kind: ResourceType) -> ResourceKey {
        ResourceKey::new(kind, self.index)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    #[error("duplicate {kind} resource index {index}")]
    DuplicateIndex {
        kind: ResourceType,
        index: ResourceIndex,
    },

    #[error("unknown {kind} resource index {index}")]
    UnknownResource {
        kind: ResourceType,
        index: ResourceIndex,
    },
}

/// Resource lists as they appear in a game definition, one per category.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceDatabaseData {
    #[serde(default)]
    pub item: Vec<SimpleResourceInfo>,
    #[serde(default)]
    pub event: Vec<SimpleResourceInfo>,
    #[serde(default)]
    pub trick: Vec<SimpleResourceInfo>,
    #[serde(default)]
    pub damage: Vec<SimpleResourceInfo>,
    #[serde(default)]
    pub version: Vec<SimpleResourceInfo>,
    #[serde(default)]
    pub misc: Vec<SimpleResourceInfo>,
    #[serde(default)]
    pub difficulty: Vec<SimpleResourceInfo>,
    #[serde(default)]
    pub pickups: Vec<SimpleResourceInfo>,
}

/// All resources known to a game definition. Built once when the game is loaded and
/// shared read-only (by reference or `Arc`) by everything that evaluates requirements.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "ResourceDatabaseData", into = "ResourceDatabaseData")]
pub struct ResourceDatabase {
    resources: [Vec<SimpleResourceInfo>; 8],
    position_by_key: HashMap<ResourceKey, usize>,
    trivial_resource: Option<ResourceKey>,
    impossible_resource: Option<ResourceKey>,
}

impl ResourceDatabase {
    pub fn new(data: ResourceDatabaseData) -> Result<ResourceDatabase, ResourceError> {
        let resources = [
            data.item,
            data.event,
            data.trick,
            data.damage,
            data.version,
            data.misc,
            data.difficulty,
            data.pickups,
        ];
        let mut position_by_key = HashMap::new();
        for kind in ResourceType::ALL {
            for (i, info) in resources[kind as usize].iter().enumerate() {
                let key = info.key(kind);
                if position_by_key.insert(key, i).is_some() {
                    return Err(ResourceError::DuplicateIndex {
                        kind,
                        index: info.index,
                    });
                }
            }
        }

        let sentinel = |index: ResourceIndex| {
            let key = ResourceKey::new(ResourceType::Misc, index);
            position_by_key.contains_key(&key).then_some(key)
        };
        let trivial_resource = sentinel(TRIVIAL_RESOURCE_INDEX);
        let impossible_resource = sentinel(IMPOSSIBLE_RESOURCE_INDEX);

        info!(
            "Resource database: {} items, {} events, {} tricks, {} damage, {} versions, {} misc, {} difficulty, {} pickups",
            resources[ResourceType::Item as usize].len(),
            resources[ResourceType::Event as usize].len(),
            resources[ResourceType::Trick as usize].len(),
            resources[ResourceType::Damage as usize].len(),
            resources[ResourceType::Version as usize].len(),
            resources[ResourceType::Misc as usize].len(),
            resources[ResourceType::Difficulty as usize].len(),
            resources[ResourceType::PickupIndex as usize].len(),
        );

        Ok(ResourceDatabase {
            resources,
            position_by_key,
            trivial_resource,
            impossible_resource,
        })
    }

    pub fn from_json_str(json_str: &str) -> Result<ResourceDatabase> {
        let data: ResourceDatabaseData =
            serde_json::from_str(json_str).context("unable to parse resource database")?;
        let database = ResourceDatabase::new(data).context("invalid resource database")?;
        Ok(database)
    }

    pub fn resources(&self, kind: ResourceType) -> &[SimpleResourceInfo] {
        &self.resources[kind as usize]
    }

    pub fn contains(&self, key: ResourceKey) -> bool {
        self.position_by_key.contains_key(&key)
    }

    pub fn get(&self, key: ResourceKey) -> Result<&SimpleResourceInfo, ResourceError> {
        match self.position_by_key.get(&key) {
            Some(&i) => Ok(&self.resources[key.kind as usize][i]),
            None => Err(ResourceError::UnknownResource {
                kind: key.kind,
                index: key.index,
            }),
        }
    }

    pub fn get_by_type_and_index(
        &self,
        kind: ResourceType,
        index: ResourceIndex,
    ) -> Result<&SimpleResourceInfo, ResourceError> {
        self.get(ResourceKey::new(kind, index))
    }

    pub fn find_by_long_name(&self, kind: ResourceType, name: &str) -> Option<&SimpleResourceInfo> {
        self.resources(kind).iter().find(|info| info.long_name == name)
    }

    /// The resource whose requirements always hold, if the game defines one.
    pub fn trivial_resource(&self) -> Option<ResourceKey> {
        self.trivial_resource
    }

    /// The resource whose requirements never hold, if the game defines one.
    pub fn impossible_resource(&self) -> Option<ResourceKey> {
        self.impossible_resource
    }
}

impl TryFrom<ResourceDatabaseData> for ResourceDatabase {
    type Error = ResourceError;

    fn try_from(data: ResourceDatabaseData) -> Result<Self, Self::Error> {
        ResourceDatabase::new(data)
    }
}

impl From<ResourceDatabase> for ResourceDatabaseData {
    fn from(database: ResourceDatabase) -> Self {
        let [item, event, trick, damage, version, misc, difficulty, pickups] =
            database.resources;
        ResourceDatabaseData {
            item,
            event,
            trick,
            damage,
            version,
            misc,
            difficulty,
            pickups,
        }
    }
}
