use std::convert::Infallible;

use bytes::Bytes;
use futures_util::stream;
use pretty_assertions::assert_eq;
use uploader_engine::{parse_stream, ChunkedLineParser, LineOutcome, UploadStageEvent};

const STREAM: &str = concat!(
    r#"{"stage":"file_validation","message":"Validating request"}"#,
    "\n",
    r#"{"stage":"document_creation","message":"Successfully created document: résumé.pdf","created_count":1,"valid_files_count":2}"#,
    "\n",
    r#"{"stage":"folder_structure","message":"Creating folder structure"}"#,
    "\n",
    r#"{"stage":"upload_complete","message":"Upload complete","total_files":2,"total_folders":1}"#,
);

fn run_chunks(chunks: &[&[u8]]) -> Vec<LineOutcome> {
    let mut parser = ChunkedLineParser::new();
    let mut outcomes = Vec::new();
    for chunk in chunks {
        outcomes.extend(parser.push(chunk));
    }
    outcomes.extend(parser.finish());
    outcomes
}

fn stages(outcomes: &[LineOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .map(|outcome| match outcome {
            LineOutcome::Event(event) => event.stage().to_string(),
            LineOutcome::Rejected(err) => format!("rejected:{}", err.line_number),
        })
        .collect()
}

#[test]
fn every_two_way_split_yields_the_same_events() {
    let bytes = STREAM.as_bytes();
    let expected = stages(&run_chunks(&[bytes]));
    assert_eq!(
        expected,
        vec![
            "file_validation",
            "document_creation",
            "folder_structure",
            "upload_complete"
        ]
    );

    // Splitting inside "é" exercises the stateful decoder as well.
    for split in 0..=bytes.len() {
        let (head, tail) = bytes.split_at(split);
        let outcomes = run_chunks(&[head, tail]);
        assert_eq!(stages(&outcomes), expected, "split at {split}");
        assert_eq!(outcomes, run_chunks(&[bytes]), "split at {split}");
    }
}

#[test]
fn byte_at_a_time_feeding_keeps_order_and_count() {
    let chunks: Vec<&[u8]> = STREAM.as_bytes().chunks(1).collect();
    let outcomes = run_chunks(&chunks);
    assert_eq!(outcomes.len(), 4);
    match &outcomes[1] {
        LineOutcome::Event(event) => {
            assert_eq!(
                event.message(),
                "Successfully created document: résumé.pdf"
            );
            assert_eq!(event.creation_progress(), Some((1, 2)));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn trailing_newline_does_not_add_an_event() {
    let with_newline = format!("{STREAM}\n");
    assert_eq!(run_chunks(&[with_newline.as_bytes()]).len(), 4);
}

#[test]
fn malformed_line_is_rejected_and_later_lines_survive() {
    let input = concat!(
        r#"{"stage":"file_validation","message":"Validating request"}"#,
        "\n",
        r#"{"stage":"document_creation","message": oops}"#,
        "\n",
        r#"{"stage":"error","message":"No valid files to upload"}"#,
        "\n",
    );
    let outcomes = run_chunks(&[input.as_bytes()]);
    assert_eq!(
        stages(&outcomes),
        vec!["file_validation", "rejected:2", "error"]
    );
}

#[test]
fn crlf_and_blank_lines_are_tolerated() {
    let input = "\r\n{\"stage\":\"error\",\"message\":\"boom\"}\r\n\r\n   \n";
    let outcomes = run_chunks(&[input.as_bytes()]);
    assert_eq!(
        outcomes,
        vec![LineOutcome::Event(UploadStageEvent::Error {
            message: "boom".to_string(),
            invalid_files: None,
            error: None,
        })]
    );
}

#[test]
fn leading_byte_order_mark_is_dropped() {
    let mut input = vec![0xEF, 0xBB, 0xBF];
    input.extend_from_slice(br#"{"stage":"error","message":"boom"}"#);
    let outcomes = run_chunks(&[&input[..2], &input[2..]]);
    assert_eq!(stages(&outcomes), vec!["error"]);
}

#[tokio::test]
async fn parse_stream_reports_outcomes_in_order() {
    let bytes = Bytes::from_static(STREAM.as_bytes());
    let chunks = vec![
        Ok::<_, Infallible>(bytes.slice(0..10)),
        Ok(bytes.slice(10..75)),
        Ok(bytes.slice(75..)),
    ];

    let mut seen = Vec::new();
    let received = parse_stream(stream::iter(chunks), |outcome| seen.push(outcome))
        .await
        .unwrap();

    assert_eq!(received, STREAM.len() as u64);
    assert_eq!(
        stages(&seen),
        vec![
            "file_validation",
            "document_creation",
            "folder_structure",
            "upload_complete"
        ]
    );
}

#[tokio::test]
async fn parse_stream_stops_at_first_error() {
    let chunks = vec![
        Ok(Bytes::from_static(
            b"{\"stage\":\"file_validation\",\"message\":\"ok\"}\n{\"stage\":",
        )),
        Err("connection reset"),
        Ok(Bytes::from_static(b"\"error\",\"message\":\"late\"}\n")),
    ];

    let mut seen = Vec::new();
    let err = parse_stream(stream::iter(chunks), |outcome| seen.push(outcome))
        .await
        .unwrap_err();

    assert_eq!(err, "connection reset");
    assert_eq!(stages(&seen), vec!["file_validation"]);
}
