//! Resource vocabulary and fixed-length resource vectors.
//!
//! The vocabulary has a single canonical ordering. Actions, Echoes and Scrip
//! always occupy the first three slots; the solver reads its objective rows
//! positionally.
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use crate::error::GrindError;

/// Every quantity tracked by the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    /// Actions spent. Recorded as a positive cost.
    Actions,
    Echoes,
    /// Hinterland Scrip.
    Scrip,
    BoneScraps,
    MemoryOfDistantShores,
    BoneFragments,
    Peppercaps,
    WarmAmber,
    CasingProgress,
    Moonlit,
    SkeletonWithSevenNecks,
    GeneratorSkeleton,
    WitheredTentacle,
    MammothRibcage,
    HolyRelic,
    BoneSurvey,
    PalaeontologicalDiscovery,
    JetBlackStinger,
    PlasterTailBones,
    HornedSkull,
    JurassicThigh,
    IceBiscuits,
    SealSkull,
}

impl Resource {
    /// Number of resources in the vocabulary.
    pub const COUNT: usize = 23;

    /// All resources in canonical order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Actions,
        Self::Echoes,
        Self::Scrip,
        Self::BoneScraps,
        Self::MemoryOfDistantShores,
        Self::BoneFragments,
        Self::Peppercaps,
        Self::WarmAmber,
        Self::CasingProgress,
        Self::Moonlit,
        Self::SkeletonWithSevenNecks,
        Self::GeneratorSkeleton,
        Self::WitheredTentacle,
        Self::MammothRibcage,
        Self::HolyRelic,
        Self::BoneSurvey,
        Self::PalaeontologicalDiscovery,
        Self::JetBlackStinger,
        Self::PlasterTailBones,
        Self::HornedSkull,
        Self::JurassicThigh,
        Self::IceBiscuits,
        Self::SealSkull,
    ];

    /// The objective rows, in order.
    pub const OBJECTIVES: [Self; 3] = [Self::Actions, Self::Echoes, Self::Scrip];

    /// Slot of this resource in every [`ResourceVector`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short name used in request files and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Actions => "Actions",
            Self::Echoes => "Echoes",
            Self::Scrip => "Scrip",
            Self::BoneScraps => "TBScraps",
            Self::MemoryOfDistantShores => "MoDS",
            Self::BoneFragments => "BFragments",
            Self::Peppercaps => "Peppercaps",
            Self::WarmAmber => "WAmber",
            Self::CasingProgress => "CasingCP",
            Self::Moonlit => "Moonlit",
            Self::SkeletonWithSevenNecks => "Sw7Necks",
            Self::GeneratorSkeleton => "GenSkeleton",
            Self::WitheredTentacle => "WTentacles",
            Self::MammothRibcage => "MRibcage",
            Self::HolyRelic => "HRelics",
            Self::BoneSurvey => "BSurveys",
            Self::PalaeontologicalDiscovery => "PDiscovery",
            Self::JetBlackStinger => "JBStinger",
            Self::PlasterTailBones => "PTBones",
            Self::HornedSkull => "HSkull",
            Self::JurassicThigh => "JThigh",
            Self::IceBiscuits => "IBiscuits",
            Self::SealSkull => "PSkull",
        }
    }

    /// True for Actions, Echoes and Scrip.
    #[must_use]
    pub const fn is_objective(self) -> bool {
        matches!(self, Self::Actions | Self::Echoes | Self::Scrip)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = GrindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|resource| resource.as_str() == s)
            .ok_or_else(|| GrindError::UnknownResource(s.to_string()))
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Resource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// Net change to every resource from running a step once.
///
/// Serialized as a map holding only the non-zero entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceVector([f64; Resource::COUNT]);

impl Default for ResourceVector {
    fn default() -> Self {
        Self::zero()
    }
}

impl ResourceVector {
    #[must_use]
    pub const fn zero() -> Self {
        Self([0.0; Resource::COUNT])
    }

    /// Build a vector from sparse `(resource, delta)` entries; later entries win.
    #[must_use]
    pub fn from_entries(entries: &[(Resource, f64)]) -> Self {
        let mut vector = Self::zero();
        for &(resource, amount) in entries {
            vector[resource] = amount;
        }
        vector
    }

    #[must_use]
    pub const fn as_slice(&self) -> &[f64; Resource::COUNT] {
        &self.0
    }

    /// Iterate `(resource, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, f64)> + '_ {
        Resource::ALL.iter().map(move |&r| (r, self.0[r.index()]))
    }

    /// Resources with a non-zero entry.
    pub fn touched(&self) -> impl Iterator<Item = Resource> + '_ {
        self.iter()
            .filter(|(_, value)| *value != 0.0)
            .map(|(resource, _)| resource)
    }

    /// Echoes plus Scrip converted at `exchange_rate`.
    #[must_use]
    pub fn gain(&self, exchange_rate: f64) -> f64 {
        self[Resource::Echoes] + exchange_rate * self[Resource::Scrip]
    }
}

impl Index<Resource> for ResourceVector {
    type Output = f64;

    fn index(&self, resource: Resource) -> &f64 {
        &self.0[resource.index()]
    }
}

impl IndexMut<Resource> for ResourceVector {
    fn index_mut(&mut self, resource: Resource) -> &mut f64 {
        &mut self.0[resource.index()]
    }
}

impl Serialize for ResourceVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let touched: Vec<(Resource, f64)> = self.iter().filter(|(_, v)| *v != 0.0).collect();
        let mut map = serializer.serialize_map(Some(touched.len()))?;
        for (resource, value) in touched {
            map.serialize_entry(resource.as_str(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResourceVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VectorVisitor;

        impl<'de> Visitor<'de> for VectorVisitor {
            type Value = ResourceVector;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of resource name to delta")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut vector = ResourceVector::zero();
                while let Some((resource, value)) = access.next_entry::<Resource, f64>()? {
                    vector[resource] = value;
                }
                Ok(vector)
            }
        }

        deserializer.deserialize_map(VectorVisitor)
    }
}
