// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde::Deserialize;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Note {
    text: String,
}

#[test]
fn encode_keeps_embedded_newlines_escaped() {
    let codec = JsonCodec::<Note>::new();
    let encoded = codec.encode(&Note { text: "line one\nline two".into() }).unwrap();
    assert!(!encoded.contains('\n'));
    assert_eq!(codec.decode(&encoded).unwrap().text, "line one\nline two");
}

#[test]
fn decode_rejects_garbage() {
    let codec = JsonCodec::<Note>::new();
    assert!(matches!(codec.decode("{not json"), Err(Error::Json(_))));
    assert!(matches!(codec.decode(r#"{"other":1}"#), Err(Error::Json(_))));
}
