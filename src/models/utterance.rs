use serde::Serialize;

/// Session date of a transcript, stamped onto every utterance it contains
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDate {
    /// Date exactly as written in the document
    pub date: Option<String>,
    /// First four characters of `date`
    pub year: Option<String>,
}

impl SessionDate {
    pub fn new(date: Option<&str>) -> Self {
        match date {
            Some(date) => Self {
                date: Some(date.to_string()),
                year: Some(date.chars().take(4).collect()),
            },
            None => Self::default(),
        }
    }
}

/// One utterance extracted from a transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    /// Normalized speaker id
    pub speaker_ref: Option<String>,
    pub utterance_type: Option<String>,
    pub debate_title: Option<String>,
    /// Never empty
    pub text: String,
    pub session_date: Option<String>,
    pub session_year: Option<String>,
}

/// An utterance with every cross-document reference resolved. Field names
/// are the output column names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedRecord {
    pub speaker_id: Option<String>,
    pub speech_type: Option<String>,
    pub debate_title: Option<String>,
    pub text: String,
    pub date: Option<String>,
    pub year: Option<String>,
    pub speaker_name: Option<String>,
    pub gender: Option<String>,
    pub party_id: Option<String>,
    pub party_name: Option<String>,
    pub chamber: Option<String>,
    pub political_orientation: Option<String>,
}

impl ResolvedRecord {
    /// Output columns, in serialization order
    pub const COLUMNS: [&'static str; 12] = [
        "speaker_id",
        "speech_type",
        "debate_title",
        "text",
        "date",
        "year",
        "speaker_name",
        "gender",
        "party_id",
        "party_name",
        "chamber",
        "political_orientation",
    ];

    /// A record carrying only the utterance's own fields
    pub fn from_utterance(utterance: Utterance) -> Self {
        Self {
            speaker_id: utterance.speaker_ref,
            speech_type: utterance.utterance_type,
            debate_title: utterance.debate_title,
            text: utterance.text,
            date: utterance.session_date,
            year: utterance.session_year,
            ..Default::default()
        }
    }
}
