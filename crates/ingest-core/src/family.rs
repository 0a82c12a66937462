//! The closed family catalogue. Reproduced verbatim as a
//! `Family` enum so that an unknown family is unrepresentable past the
//! validation boundary (`Family::from_str` is the single validation
//! gate), using the same `FromStr`/`Display` idiom as the job-state
//! enums elsewhere in this workspace.

use std::fmt;
use std::str::FromStr;

macro_rules! family_enum {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Family {
            $($variant),+
        }

        impl Family {
            pub const ALL: &'static [Family] = &[$(Family::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(Family::$variant => $name),+
                }
            }
        }

        impl fmt::Display for Family {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.name())
            }
        }

        impl FromStr for Family {
            type Err = UnknownFamily;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Family::$variant),)+
                    other => Err(UnknownFamily(other.to_string())),
                }
            }
        }
    };
}

family_enum! {
    Agents => "agents",
    Categories => "categories",
    Blueprints => "blueprints",
    MarketGroups => "marketGroups",
    MetaGroups => "metaGroups",
    NpcCorporations => "npcCorporations",
    TypeIds => "typeIDs",
    Types => "types",
    TypeMaterials => "typeMaterials",
    Races => "races",
    Factions => "factions",
    Bloodlines => "bloodlines",
    Groups => "groups",
    DogmaAttributes => "dogmaAttributes",
    Ancestries => "ancestries",
    Certificates => "certificates",
    CharacterAttributes => "characterAttributes",
    Skins => "skins",
    StaStations => "staStations",
    DogmaEffects => "dogmaEffects",
    IconIds => "iconIDs",
    GraphicIds => "graphicIDs",
    TypeDogma => "typeDogma",
    InvFlags => "invFlags",
    StationServices => "stationServices",
    StationOperations => "stationOperations",
    ResearchAgents => "researchAgents",
    AgentsInSpace => "agentsInSpace",
    ContrabandTypes => "contrabandTypes",
    CorporationActivities => "corporationActivities",
    InvItems => "invItems",
    NpcCorporationDivisions => "npcCorporationDivisions",
    ControlTowerResources => "controlTowerResources",
    DogmaAttributeCategories => "dogmaAttributeCategories",
    InvNames => "invNames",
    InvPositions => "invPositions",
    InvUniqueNames => "invUniqueNames",
    PlanetResources => "planetResources",
    PlanetSchematics => "planetSchematics",
    SkinLicenses => "skinLicenses",
    SkinMaterials => "skinMaterials",
    SovereigntyUpgrades => "sovereigntyUpgrades",
    TranslationLanguages => "translationLanguages",
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFamily(pub String);

impl fmt::Display for UnknownFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown family: {}", self.0)
    }
}

impl std::error::Error for UnknownFamily {}

/// How a family's items are keyed, dictating dispatch in the import pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyKeying {
    /// The SDL's own map key is the cache key (the majority).
    MapKeyed,
    /// The cache key is derived from a named integer field on each item.
    ArrayKeyed { id_field: &'static str },
    /// Computed from another family, item-by-item, via `SdlCatalog::get_materials`.
    Derived,
}

impl Family {
    pub fn keying(self) -> FamilyKeying {
        match self {
            Family::TypeMaterials => FamilyKeying::Derived,
            Family::StaStations => FamilyKeying::ArrayKeyed { id_field: "stationID" },
            Family::InvFlags => FamilyKeying::ArrayKeyed { id_field: "flagID" },
            Family::InvItems => FamilyKeying::ArrayKeyed { id_field: "itemID" },
            Family::InvNames => FamilyKeying::ArrayKeyed { id_field: "itemID" },
            Family::InvPositions => FamilyKeying::ArrayKeyed { id_field: "itemID" },
            Family::InvUniqueNames => FamilyKeying::ArrayKeyed { id_field: "itemID" },
            _ => FamilyKeying::MapKeyed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_from_str() {
        for family in Family::ALL {
            let parsed = Family::from_str(&family.to_string()).unwrap();
            assert_eq!(parsed, *family);
        }
    }

    #[test]
    fn unknown_family_name_is_rejected() {
        assert!(Family::from_str("notAFamily").is_err());
    }

    #[test]
    fn all_contains_the_full_catalogue() {
        assert_eq!(Family::ALL.len(), 43);
    }

    #[test]
    fn type_materials_is_derived() {
        assert_eq!(Family::TypeMaterials.keying(), FamilyKeying::Derived);
    }
}
