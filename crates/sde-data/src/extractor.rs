//! Archive extraction and entry filtering: the zip is extracted into a
//! staging tree, keeping only entries that both sit under a recognized
//! path shape and have a basename in the known set of SDE file names.

use crate::error::SdeError;
use std::io::Read;
use std::path::Path;

/// The known SDE file stems. These mirror the closed family catalogue
/// one-for-one: each family is loaded from a file of the same basename,
/// in either `.yaml` or `.json` form.
pub const SDE_FILE_STEMS: &[&str] = &[
    "agents",
    "categories",
    "blueprints",
    "marketGroups",
    "metaGroups",
    "npcCorporations",
    "typeIDs",
    "types",
    "typeMaterials",
    "races",
    "factions",
    "bloodlines",
    "groups",
    "dogmaAttributes",
    "ancestries",
    "certificates",
    "characterAttributes",
    "skins",
    "staStations",
    "dogmaEffects",
    "iconIDs",
    "graphicIDs",
    "typeDogma",
    "invFlags",
    "stationServices",
    "stationOperations",
    "researchAgents",
    "agentsInSpace",
    "contrabandTypes",
    "corporationActivities",
    "invItems",
    "npcCorporationDivisions",
    "controlTowerResources",
    "dogmaAttributeCategories",
    "invNames",
    "invPositions",
    "invUniqueNames",
    "planetResources",
    "planetSchematics",
    "skinLicenses",
    "skinMaterials",
    "sovereigntyUpgrades",
    "translationLanguages",
];

/// A retained archive entry after filtering, with its path relative to
/// the archive root.
pub struct RetainedEntry {
    pub archive_path: String,
    pub contents: Vec<u8>,
}

/// Whether `archive_path` lies under a recognized path shape: `fsd/`,
/// `bsd/`, a direct root file, or a universe-data substructure matching
/// `*_region.*`, `*_constellation.*`, or `*_solarsystem.*`.
fn is_recognized_path_shape(archive_path: &str) -> bool {
    let path = archive_path.replace('\\', "/");
    if path.starts_with("fsd/") || path.starts_with("bsd/") {
        return true;
    }
    if !path.contains('/') {
        return true;
    }
    let basename = path.rsplit('/').next().unwrap_or(&path);
    basename.contains("_region.")
        || basename.contains("_constellation.")
        || basename.contains("_solarsystem.")
}

/// Whether the entry's basename (stem + extension) is one of the known
/// SDE file names, in either `.yaml` or `.json` form.
fn is_known_sde_file(archive_path: &str) -> bool {
    let basename = archive_path.rsplit('/').next().unwrap_or(archive_path);
    let Some((stem, ext)) = basename.rsplit_once('.') else {
        return false;
    };
    (ext == "yaml" || ext == "json") && SDE_FILE_STEMS.contains(&stem)
}

/// Extract `archive_path` into `staging_dir`, keeping only entries that
/// pass both filters. Returns the retained entries' bytes in memory so
/// the caller can run YAML→JSON conversion without a second disk pass.
pub fn extract_filtered(archive_path: &Path) -> Result<Vec<RetainedEntry>, SdeError> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut retained = Vec::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if !is_recognized_path_shape(&name) || !is_known_sde_file(&name) {
            continue;
        }

        let mut contents = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut contents)?;
        retained.push(RetainedEntry {
            archive_path: name,
            contents,
        });
    }

    Ok(retained)
}

pub fn basename(archive_path: &str) -> &str {
    archive_path.rsplit('/').next().unwrap_or(archive_path)
}

pub fn stem(archive_path: &str) -> Option<&str> {
    basename(archive_path).rsplit_once('.').map(|(stem, _)| stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_level_file_is_recognized() {
        assert!(is_recognized_path_shape("agents.yaml"));
    }

    #[test]
    fn fsd_prefixed_path_is_recognized() {
        assert!(is_recognized_path_shape("fsd/agents.yaml"));
    }

    #[test]
    fn universe_data_region_file_is_recognized() {
        assert!(is_recognized_path_shape(
            "universe/eve/region/TheForge/region.staticdata_region.yaml"
        ));
    }

    #[test]
    fn unrelated_nested_path_is_not_recognized() {
        assert!(!is_recognized_path_shape("other/misc/notes.txt"));
    }

    #[test]
    fn known_sde_file_accepts_both_extensions() {
        assert!(is_known_sde_file("fsd/agents.yaml"));
        assert!(is_known_sde_file("agents.json"));
        assert!(!is_known_sde_file("agents.txt"));
        assert!(!is_known_sde_file("unknownFamily.yaml"));
    }
}
