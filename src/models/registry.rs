use std::collections::HashMap;

/// Role value the corpus uses for political parties
pub const POLITICAL_PARTY_ROLE: &str = "politicalParty";

/// `state/@type` value holding a party's orientation
pub const POLITICAL_ORIENTATION_STATE: &str = "politicalOrientation";

/// Strip the cross-reference marker from an identifier.
///
/// `"#party.CON"` becomes `"party.CON"`. Applying it twice gives the same
/// result as applying it once.
pub fn normalize_ref(raw: &str) -> &str {
    raw.trim_start_matches(|c: char| c == '#' || c.is_whitespace())
        .trim_end()
}

/// Compare two controlled values ignoring case, whitespace, `_` and `-`,
/// so `politicalParty` and `political party` are the same role.
pub fn same_term(a: &str, b: &str) -> bool {
    let fold = |s: &str| {
        s.chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect::<String>()
    };
    fold(a) == fold(b)
}

/// A person from the speaker document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Speaker {
    pub id: String,
    /// Personal name, possibly empty
    pub name: String,
    pub gender: Option<String>,
    /// First `member` affiliation, already normalized
    pub party_ref: Option<String>,
}

/// Speaker id -> speaker. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct SpeakerRegistry {
    speakers: HashMap<String, Speaker>,
}

impl SpeakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a speaker. A later entry with the same id replaces the earlier
    /// one; the replaced speaker is returned.
    pub fn insert(&mut self, speaker: Speaker) -> Option<Speaker> {
        self.speakers.insert(speaker.id.clone(), speaker)
    }

    pub fn get(&self, id: &str) -> Option<&Speaker> {
        self.speakers.get(id)
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Speaker> {
        self.speakers.values()
    }
}

/// Orientation category id -> display label
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    labels: HashMap<String, String>,
}

impl Taxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(id.into(), label.into());
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// An organization entry as read from the organization document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: String,
    /// Full display name, empty when the document has none
    pub name: String,
    pub role: Option<String>,
    /// Resolved orientation label; only meaningful for political parties
    pub orientation: Option<String>,
}

impl Organization {
    pub fn is_political_party(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|role| same_term(role, POLITICAL_PARTY_ROLE))
    }
}

/// The three organization lookups: name, role and (parties only)
/// orientation.
#[derive(Debug, Clone, Default)]
pub struct OrganizationRegistry {
    names: HashMap<String, String>,
    roles: HashMap<String, String>,
    orientations: HashMap<String, Option<String>>,
}

impl OrganizationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, org: Organization) {
        let is_party = org.is_political_party();
        let Organization {
            id,
            name,
            role,
            orientation,
        } = org;

        self.names.insert(id.clone(), name);
        match role {
            Some(role) => {
                self.roles.insert(id.clone(), role);
            }
            None => {
                self.roles.remove(&id);
            }
        }
        if is_party {
            self.orientations.insert(id, orientation);
        } else {
            self.orientations.remove(&id);
        }
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn role(&self, id: &str) -> Option<&str> {
        self.roles.get(id).map(String::as_str)
    }

    /// Orientation label of a political party. `None` both for parties
    /// without a resolvable orientation and for non-party organizations.
    pub fn orientation(&self, id: &str) -> Option<&str> {
        self.orientations.get(id).and_then(|o| o.as_deref())
    }

    pub fn is_party(&self, id: &str) -> bool {
        self.orientations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn party_count(&self) -> usize {
        self.orientations.len()
    }

    /// Party id and orientation label (if resolved), in no particular order
    pub fn party_orientations(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.orientations
            .iter()
            .map(|(id, label)| (id.as_str(), label.as_deref()))
    }
}
