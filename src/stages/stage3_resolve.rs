use tracing::info;

use crate::models::{normalize_ref, ResolvedRecord, Utterance};
use crate::stages::Registries;

/// Result of the resolution stage
#[derive(Debug, Default)]
pub struct ResolveResult {
    /// One record per input utterance, same order
    pub records: Vec<ResolvedRecord>,
    /// Records whose speaker reference was not in the registry
    pub unknown_speakers: usize,
    /// Records whose speaker has no party, or whose party is not an
    /// organization in the registry
    pub unresolved_parties: usize,
}

impl Registries {
    /// Resolve one utterance along speaker -> party -> organization ->
    /// orientation. A miss at any hop leaves that hop's fields and every
    /// later one empty; the record is always produced.
    pub fn resolve(&self, utterance: Utterance) -> ResolvedRecord {
        let speaker = utterance
            .speaker_ref
            .as_deref()
            .and_then(|id| self.speakers.get(normalize_ref(id)));

        let party_id = speaker
            .and_then(|s| s.party_ref.as_deref())
            .map(normalize_ref)
            .filter(|p| !p.is_empty());

        let orgs = &self.organizations;
        let party_name = party_id.and_then(|p| orgs.name(p)).map(str::to_string);
        let chamber = party_id.and_then(|p| orgs.role(p)).map(str::to_string);
        let political_orientation = party_id
            .and_then(|p| orgs.orientation(p))
            .map(str::to_string);

        let speaker_name = speaker.map(|s| s.name.clone());
        let gender = speaker.and_then(|s| s.gender.clone());
        let party_id = party_id.map(str::to_string);

        ResolvedRecord {
            speaker_name,
            gender,
            party_id,
            party_name,
            chamber,
            political_orientation,
            ..ResolvedRecord::from_utterance(utterance)
        }
    }
}

/// Execute the resolution stage over every utterance
pub fn execute_resolve(utterances: Vec<Utterance>, registries: &Registries) -> ResolveResult {
    let mut result = ResolveResult {
        records: Vec::with_capacity(utterances.len()),
        ..Default::default()
    };

    for utterance in utterances {
        let record = registries.resolve(utterance);
        if record.speaker_name.is_none() {
            result.unknown_speakers += 1;
        } else if record.party_name.is_none() {
            result.unresolved_parties += 1;
        }
        result.records.push(record);
    }

    info!(
        "Resolved {} records ({} unknown speakers, {} without a known party)",
        result.records.len(),
        result.unknown_speakers,
        result.unresolved_parties
    );
    result
}
