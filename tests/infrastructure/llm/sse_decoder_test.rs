use simavi::infrastructure::llm::{SseDecoder, SseFrame};

fn chunk_line(content: &str) -> String {
    let payload = serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion.chunk",
        "choices": [{ "index": 0, "delta": { "content": content } }]
    });
    format!("data: {payload}\n\n")
}

fn sample_stream() -> Vec<u8> {
    let mut body = String::new();
    body.push_str(": keep-alive comment\n\n");
    body.push_str("data: {\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n");
    for fragment in [r#"{"objects": ["Stra"#, "ße", r#"nschild"], "#, r#""isSign": true}"#] {
        body.push_str(&chunk_line(fragment));
    }
    body.push_str("data: [DONE]\n\n");
    body.into_bytes()
}

fn decode_in_parts(parts: &[&[u8]]) -> (String, bool) {
    let mut decoder = SseDecoder::new();
    let mut content = String::new();
    let mut saw_done = false;
    for part in parts {
        for frame in decoder.push(part) {
            match frame {
                SseFrame::Delta(delta) => content.push_str(&delta),
                SseFrame::Done => saw_done = true,
            }
        }
    }
    (content, saw_done)
}

const EXPECTED: &str = r#"{"objects": ["Straßenschild"], "isSign": true}"#;

#[test]
fn given_whole_stream_in_one_chunk_when_decoding_then_content_is_concatenated() {
    let body = sample_stream();

    let (content, done) = decode_in_parts(&[&body]);

    assert_eq!(content, EXPECTED);
    assert!(done);
}

#[test]
fn given_any_two_split_points_when_decoding_then_same_json_is_reassembled() {
    let body = sample_stream();

    for first in 0..=body.len() {
        for second in (first..=body.len()).step_by(7) {
            let (content, done) =
                decode_in_parts(&[&body[..first], &body[first..second], &body[second..]]);
            assert_eq!(content, EXPECTED, "split at {first}/{second}");
            assert!(done, "split at {first}/{second}");
            let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
            assert_eq!(parsed["objects"][0], "Straßenschild");
        }
    }
}

#[test]
fn given_byte_by_byte_delivery_when_decoding_then_content_is_intact() {
    let body = sample_stream();
    let parts: Vec<&[u8]> = body.chunks(1).collect();

    let (content, done) = decode_in_parts(&parts);

    assert_eq!(content, EXPECTED);
    assert!(done);
}

#[test]
fn given_crlf_line_endings_when_decoding_then_lines_are_recognised() {
    let body = chunk_line("hello").replace('\n', "\r\n") + "data: [DONE]\r\n";

    let (content, done) = decode_in_parts(&[body.as_bytes()]);

    assert_eq!(content, "hello");
    assert!(done);
}

#[test]
fn given_malformed_line_when_decoding_then_it_is_skipped() {
    let body = format!("data: {{not json\n{}data: [DONE]\n", chunk_line("ok"));

    let (content, done) = decode_in_parts(&[body.as_bytes()]);

    assert_eq!(content, "ok");
    assert!(done);
}

#[test]
fn given_data_after_done_when_decoding_then_it_is_ignored() {
    let body = format!("data: [DONE]\n{}", chunk_line("late"));
    let mut decoder = SseDecoder::new();

    let frames = decoder.push(body.as_bytes());

    assert_eq!(frames, vec![SseFrame::Done]);
    assert!(decoder.is_done());
    assert!(decoder.push(chunk_line("later").as_bytes()).is_empty());
}

#[test]
fn given_stream_without_done_when_finishing_then_decoder_is_not_done() {
    let mut decoder = SseDecoder::new();
    decoder.push(chunk_line("partial").as_bytes());

    let trailing = decoder.finish();

    assert!(trailing.is_empty());
    assert!(!decoder.is_done());
}

#[test]
fn given_unterminated_last_line_when_finishing_then_it_is_decoded() {
    let mut decoder = SseDecoder::new();
    let frames = decoder.push(b"data: [DONE]");
    assert!(frames.is_empty());

    let trailing = decoder.finish();

    assert_eq!(trailing, vec![SseFrame::Done]);
}
