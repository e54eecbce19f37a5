use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{RegistryError, RegistryKind};
use crate::io::{parse_document_file, Document, RegistryPaths};
use crate::models::{
    normalize_ref, same_term, Organization, OrganizationRegistry, Speaker, SpeakerRegistry,
    Taxonomy, POLITICAL_ORIENTATION_STATE,
};

/// The three read-only lookups the resolution stage needs
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub speakers: SpeakerRegistry,
    pub taxonomy: Taxonomy,
    pub organizations: OrganizationRegistry,
}

impl Registries {
    /// Load all registries. The taxonomy is loaded before the organizations,
    /// which resolve party orientations through it.
    pub fn load(paths: &RegistryPaths) -> Result<Self, RegistryError> {
        let open = |kind: RegistryKind, path: &Path| {
            info!("Loading {} registry from {:?}", kind, path);
            parse_document_file(path, None)
                .map_err(|source| RegistryError::Document { kind, source })
        };

        let speakers = load_speakers(&open(RegistryKind::Speakers, &paths.speakers)?);
        let taxonomy = load_taxonomy(&open(RegistryKind::Taxonomy, &paths.taxonomy)?);
        let organizations = load_organizations(
            &open(RegistryKind::Organizations, &paths.organizations)?,
            &taxonomy,
        );

        info!(
            "Loaded {} speakers, {} orientation categories, {} organizations ({} parties)",
            speakers.len(),
            taxonomy.len(),
            organizations.len(),
            organizations.party_count()
        );

        Ok(Self {
            speakers,
            taxonomy,
            organizations,
        })
    }
}

/// Build the speaker registry from a `listPerson` document.
///
/// Duplicate ids are last-wins. Of several `member` affiliations, the first
/// one is the party reference. The name comes from the first `persName`
/// only; later name variants are ignored.
pub fn load_speakers(doc: &Document) -> SpeakerRegistry {
    let mut registry = SpeakerRegistry::new();

    for person in doc.find_all("person") {
        let Some(id) = person.id() else {
            debug!("Skipping person without xml:id");
            continue;
        };

        let name = person
            .find("persName")
            .map(|n| n.joined_text())
            .unwrap_or_default();
        let gender = person
            .find_all("sex")
            .find_map(|s| s.attr("value"))
            .map(str::to_string);
        let party_ref = person
            .find_all("affiliation")
            .filter(|a| a.attr("role") == Some("member"))
            .find_map(|a| a.attr("ref"))
            .map(|r| normalize_ref(r).to_string());

        let speaker = Speaker {
            id: id.to_string(),
            name,
            gender,
            party_ref,
        };
        if registry.insert(speaker).is_some() {
            warn!("Duplicate speaker id {}, keeping the later entry", id);
        }
    }

    registry
}

/// Build the orientation taxonomy from a category document. A category
/// without a term maps to an empty label.
pub fn load_taxonomy(doc: &Document) -> Taxonomy {
    let mut taxonomy = Taxonomy::new();

    for category in doc.find_all("category") {
        let Some(id) = category.id() else {
            debug!("Skipping category without xml:id");
            continue;
        };
        let label = category
            .find("term")
            .map(|t| t.string_value().trim().to_string())
            .unwrap_or_default();
        debug!("Orientation category {} = {:?}", id, label);
        taxonomy.insert(id, label);
    }

    taxonomy
}

/// Build the organization registry from a `listOrg` document, resolving
/// each party's orientation through the taxonomy. A party whose orientation
/// cannot be resolved gets `None`.
pub fn load_organizations(doc: &Document, taxonomy: &Taxonomy) -> OrganizationRegistry {
    let mut registry = OrganizationRegistry::new();

    for org in doc.find_all("org") {
        let Some(id) = org.id() else {
            debug!("Skipping org without xml:id");
            continue;
        };

        let name = org
            .find_all("orgName")
            .find(|n| n.attr("full") == Some("yes"))
            .map(|n| n.string_value().trim().to_string())
            .unwrap_or_default();

        let mut organization = Organization {
            id: id.to_string(),
            name,
            role: org.attr("role").map(str::to_string),
            orientation: None,
        };

        if organization.is_political_party() {
            let category = org
                .find_all("state")
                .filter(|s| {
                    s.attr("type")
                        .is_some_and(|t| same_term(t, POLITICAL_ORIENTATION_STATE))
                })
                .flat_map(|s| s.children().filter(|c| c.name() == "state"))
                .find_map(|s| s.attr("ana"))
                .map(normalize_ref)
                .filter(|c| !c.is_empty());

            organization.orientation = category
                .and_then(|c| taxonomy.label(c))
                .map(str::to_string);

            if organization.orientation.is_none() {
                debug!("Party {} has no resolvable orientation", id);
            }
        }

        registry.insert(organization);
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_document;

    const PERSONS: &str = r##"<listPerson xmlns="http://www.tei-c.org/ns/1.0">
  <person xml:id="S1">
    <persName>
      <surname>Smith</surname>
      <forename>Jane</forename>
    </persName>
    <persName><surname>Smith-Jones</surname></persName>
    <sex value="F"/>
    <affiliation role="candidate" ref="#party.X"/>
    <affiliation role="member" ref="#P1"/>
    <affiliation role="member" ref="#parliament"/>
  </person>
  <person xml:id="S2">
    <persName><forename>Bob</forename></persName>
  </person>
  <person xml:id="S2">
    <persName><forename>Robert</forename></persName>
    <sex value="M"/>
  </person>
  <person>
    <persName>Nobody</persName>
  </person>
</listPerson>"##;

    const TAXONOMY: &str = r#"<taxonomy xmlns="http://www.tei-c.org/ns/1.0">
  <category xml:id="C1">
    <catDesc><term>Left</term></catDesc>
  </category>
  <category xml:id="C2">
    <catDesc><term> Centre-left </term>: moderate</catDesc>
  </category>
  <category xml:id="C3">
    <catDesc><term/></catDesc>
  </category>
  <category xml:id="C4"/>
</taxonomy>"#;

    const ORGS: &str = r##"<listOrg xmlns="http://www.tei-c.org/ns/1.0">
  <org xml:id="P1" role="politicalParty">
    <orgName full="abb">CL</orgName>
    <orgName full="yes">Centre Left Party</orgName>
    <state type="politicalOrientation">
      <state ana="#C2"/>
    </state>
  </org>
  <org xml:id="P2" role="politicalParty">
    <orgName full="yes">No Orientation Party</orgName>
  </org>
  <org xml:id="P3" role="politicalParty">
    <orgName full="yes">Unknown Category Party</orgName>
    <state type="politicalOrientation"><state ana="#C99"/></state>
  </org>
  <org xml:id="parliament" role="parliament">
    <orgName full="yes">House of Commons</orgName>
    <state type="politicalOrientation"><state ana="#C1"/></state>
  </org>
  <org xml:id="anon"/>
</listOrg>"##;

    fn doc(xml: &str) -> Document {
        parse_document(xml, None).unwrap()
    }

    #[test]
    fn test_load_speakers() {
        let speakers = load_speakers(&doc(PERSONS));

        assert_eq!(speakers.len(), 2);

        let s1 = speakers.get("S1").unwrap();
        assert_eq!(s1.name, "Smith Jane");
        assert_eq!(s1.gender.as_deref(), Some("F"));
        assert_eq!(s1.party_ref.as_deref(), Some("P1"));
    }

    #[test]
    fn test_load_speakers_last_wins_and_no_affiliation() {
        let speakers = load_speakers(&doc(PERSONS));

        let s2 = speakers.get("S2").unwrap();
        assert_eq!(s2.name, "Robert");
        assert_eq!(s2.gender.as_deref(), Some("M"));
        assert_eq!(s2.party_ref, None);
    }

    #[test]
    fn test_load_taxonomy() {
        let taxonomy = load_taxonomy(&doc(TAXONOMY));

        assert_eq!(taxonomy.len(), 4);
        assert_eq!(taxonomy.label("C1"), Some("Left"));
        assert_eq!(taxonomy.label("C2"), Some("Centre-left"));
        assert_eq!(taxonomy.label("C3"), Some(""));
        assert_eq!(taxonomy.label("C4"), Some(""));
    }

    #[test]
    fn test_load_organizations() {
        let taxonomy = load_taxonomy(&doc(TAXONOMY));
        let orgs = load_organizations(&doc(ORGS), &taxonomy);

        assert_eq!(orgs.len(), 5);
        assert_eq!(orgs.name("P1"), Some("Centre Left Party"));
        assert_eq!(orgs.role("P1"), Some("politicalParty"));
        assert_eq!(orgs.orientation("P1"), Some("Centre-left"));

        assert!(orgs.is_party("P2"));
        assert_eq!(orgs.orientation("P2"), None);
        assert!(orgs.is_party("P3"));
        assert_eq!(orgs.orientation("P3"), None);

        // Orientation is only tracked for parties
        assert!(!orgs.is_party("parliament"));
        assert_eq!(orgs.orientation("parliament"), None);
        assert_eq!(orgs.name("parliament"), Some("House of Commons"));

        assert_eq!(orgs.name("anon"), Some(""));
        assert_eq!(orgs.role("anon"), None);
        assert_eq!(orgs.party_count(), 3);
    }

    #[test]
    fn test_load_organizations_missing_taxonomy_entry() {
        let orgs = load_organizations(&doc(ORGS), &Taxonomy::new());
        assert_eq!(orgs.orientation("P1"), None);
        assert_eq!(orgs.name("P1"), Some("Centre Left Party"));
    }

    #[test]
    fn test_registries_load_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let speakers = dir.path().join("listPerson.xml");
        let taxonomy = dir.path().join("taxonomy.xml");
        let orgs = dir.path().join("listOrg.xml");
        std::fs::write(&speakers, PERSONS).unwrap();
        std::fs::write(&taxonomy, "<taxonomy><category></taxonomy>").unwrap();
        std::fs::write(&orgs, ORGS).unwrap();

        let paths = RegistryPaths {
            speakers,
            taxonomy,
            organizations: orgs,
        };
        let err = Registries::load(&paths).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Document {
                kind: RegistryKind::Taxonomy,
                ..
            }
        ));
    }
}
