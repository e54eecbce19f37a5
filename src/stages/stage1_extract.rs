use tracing::debug;

use crate::io::{join_fragments, Document};
use crate::models::{normalize_ref, SessionDate, Utterance};

/// `div/@type` marking a debate section
pub const DEBATE_SECTION: &str = "debateSection";

/// Read the session date: the first `date/@when` under
/// `fileDesc//sourceDesc`
pub fn session_date(doc: &Document) -> SessionDate {
    let when = doc
        .find_all("fileDesc")
        .flat_map(|f| f.find_all("sourceDesc"))
        .flat_map(|s| s.find_all("date"))
        .find_map(|d| d.attr("when"));
    SessionDate::new(when)
}

/// Extract every utterance from one transcript, in document order.
///
/// Utterances whose text is empty after trimming are dropped. All emitted
/// utterances carry the document's session date.
pub fn extract_utterances(doc: &Document) -> Vec<Utterance> {
    let date = session_date(doc);
    let mut utterances = Vec::new();

    for div in doc
        .find_all("div")
        .filter(|d| d.attr("type") == Some(DEBATE_SECTION))
    {
        let debate_title = div
            .child("head")
            .map(|h| h.string_value().trim().to_string());

        for u in div.find_all("u") {
            let text = join_fragments(
                u.find_outermost("seg")
                    .into_iter()
                    .flat_map(|seg| seg.text_fragments()),
            );
            if text.is_empty() {
                debug!("Dropping empty utterance {:?}", u.id());
                continue;
            }

            utterances.push(Utterance {
                speaker_ref: u.attr("who").map(|w| normalize_ref(w).to_string()),
                utterance_type: u.attr("ana").map(str::to_string),
                debate_title: debate_title.clone(),
                text,
                session_date: date.date.clone(),
                session_year: date.year.clone(),
            });
        }
    }

    utterances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_document;

    const TRANSCRIPT: &str = r##"<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <teiHeader>
    <fileDesc>
      <titleStmt><date when="1999-01-01"/></titleStmt>
      <sourceDesc>
        <bibl><date when="2020-03-05">5 March 2020</date></bibl>
      </sourceDesc>
    </fileDesc>
  </teiHeader>
  <text>
    <body>
      <div type="preface"><u who="#S9"><seg>Not a debate</seg></u></div>
      <div type="debateSection">
        <head>Budget Debate</head>
        <u who="#S1" ana="#regular" xml:id="u1">
          <seg>Hello</seg>
          <seg>house</seg>
        </u>
        <u who="#S2" ana="#chair" xml:id="u2"><seg>  </seg><note>(Laughter)</note></u>
        <u ana="#regular" xml:id="u3"><seg>Order, <kinesic/>order.</seg></u>
      </div>
      <div type="debateSection">
        <u who="#S2" xml:id="u4"><seg>Untitled section</seg></u>
      </div>
    </body>
  </text>
</TEI>"##;

    #[test]
    fn test_extract_utterances() {
        let doc = parse_document(TRANSCRIPT, None).unwrap();
        let utterances = extract_utterances(&doc);

        assert_eq!(utterances.len(), 3);

        let first = &utterances[0];
        assert_eq!(first.speaker_ref.as_deref(), Some("S1"));
        assert_eq!(first.utterance_type.as_deref(), Some("#regular"));
        assert_eq!(first.debate_title.as_deref(), Some("Budget Debate"));
        assert_eq!(first.text, "Hello house");
        assert_eq!(first.session_date.as_deref(), Some("2020-03-05"));
        assert_eq!(first.session_year.as_deref(), Some("2020"));

        // No speaker reference
        assert_eq!(utterances[1].speaker_ref, None);
        assert_eq!(utterances[1].text, "Order, order.");

        // Section without a head
        assert_eq!(utterances[2].debate_title, None);
        assert_eq!(utterances[2].text, "Untitled section");
    }

    #[test]
    fn test_no_empty_text() {
        let doc = parse_document(TRANSCRIPT, None).unwrap();
        assert!(extract_utterances(&doc).iter().all(|u| !u.text.is_empty()));
    }

    #[test]
    fn test_nested_seg_text_counted_once() {
        let xml = r##"<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <text><div type="debateSection">
    <u who="#S1"><seg>Outer <seg>inner</seg> tail</seg></u>
  </div></text>
</TEI>"##;
        let doc = parse_document(xml, None).unwrap();
        let utterances = extract_utterances(&doc);

        assert_eq!(utterances.len(), 1);
        assert_eq!(utterances[0].text, "Outer inner tail");
    }

    #[test]
    fn test_missing_date() {
        let xml = r##"<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <text><div type="debateSection"><head>T</head>
    <u who="#S1"><seg>Text</seg></u>
  </div></text>
</TEI>"##;
        let doc = parse_document(xml, None).unwrap();
        let utterances = extract_utterances(&doc);

        assert_eq!(utterances.len(), 1);
        assert_eq!(utterances[0].session_date, None);
        assert_eq!(utterances[0].session_year, None);
    }

    #[test]
    fn test_document_without_sections() {
        let doc = parse_document("<TEI><text/></TEI>", None).unwrap();
        assert!(extract_utterances(&doc).is_empty());
    }
}
