use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder display name used when structure name resolution fails.
///
/// Name resolution failure degrades to this value rather than failing the
/// whole sync; a later forced resync can recover the real name.
pub const UNKNOWN_STRUCTURE_NAME: &str = "Unknown Structure";

/// EVE Online type ID for Magmatic Gas (Metenox reagent).
pub const MAGMATIC_GAS_TYPE_ID: i64 = 81143;

/// EVE Online type IDs for the four fuel block variants
/// (Nitrogen, Hydrogen, Helium, Oxygen).
pub const FUEL_BLOCK_TYPE_IDS: [i64; 4] = [4051, 4246, 4247, 4312];

/// Logical kind of a monitored consumable, derived from an ESI type ID via
/// the static lookup table in [`ResourceKind::from_type_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    MagmaticGas,
    FuelBlocks,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::MagmaticGas, ResourceKind::FuelBlocks];

    /// Maps an ESI type ID to a logical resource kind.
    ///
    /// Returns `None` for type IDs this crate does not monitor; such assets
    /// are dropped during sync rather than carried through as opaque rows.
    pub fn from_type_id(type_id: i64) -> Option<Self> {
        if type_id == MAGMATIC_GAS_TYPE_ID {
            Some(ResourceKind::MagmaticGas)
        } else if FUEL_BLOCK_TYPE_IDS.contains(&type_id) {
            Some(ResourceKind::FuelBlocks)
        } else {
            None
        }
    }

    /// Stable key used in persisted alert state.
    pub fn key(&self) -> &'static str {
        match self {
            ResourceKind::MagmaticGas => "magmatic_gas",
            ResourceKind::FuelBlocks => "fuel_blocks",
        }
    }

    /// Human-readable label used in alert messages.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::MagmaticGas => "Magmatic Gas",
            ResourceKind::FuelBlocks => "Fuel Blocks",
        }
    }
}

/// Aggregated fuel-bay quantity for one resource kind in one structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub structure_id: i64,
    pub resource_kind: ResourceKind,
    pub quantity: i64,
}

/// Last-known structure and asset state for one tenant.
///
/// Replaced as a whole on every successful sync so readers never observe a
/// mix of old and new structure sets; structures no longer returned by ESI
/// disappear along with their assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantStructures {
    /// Structure ID to display name.
    pub structures: BTreeMap<i64, String>,
    pub assets: Vec<AssetSnapshot>,
    pub synced_at: Option<DateTime<Utc>>,
}

impl TenantStructures {
    pub fn structure_name(&self, structure_id: i64) -> &str {
        self.structures
            .get(&structure_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_STRUCTURE_NAME)
    }

    /// Total cached quantity of `kind` in the given structure's fuel bay.
    pub fn quantity_of(&self, structure_id: i64, kind: ResourceKind) -> i64 {
        self.assets
            .iter()
            .filter(|a| a.structure_id == structure_id && a.resource_kind == kind)
            .map(|a| a.quantity)
            .sum()
    }
}
