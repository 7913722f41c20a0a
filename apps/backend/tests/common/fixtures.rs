//! Request bodies for integration tests.

use serde_json::{json, Value};
use uuid::Uuid;

pub const PASSAGES: [(&str, &str); 7] = [
    ("John 3:16", "For God so loved the world, that he gave his only begotten Son"),
    ("Psalm 23:1", "The LORD is my shepherd; I shall not want."),
    ("Romans 8:28", "And we know that all things work together for good to them that love God"),
    ("Philippians 4:13", "I can do all things through Christ which strengtheneth me."),
    ("Genesis 1:1", "In the beginning God created the heaven and the earth."),
    ("1 John 1:9", "If we confess our sins, he is faithful and just to forgive us our sins"),
    ("Proverbs 3:5", "Trust in the LORD with all thine heart; and lean not unto thine own understanding."),
];

pub fn register_request(name: Option<&str>) -> Value {
    json!({ "name": name })
}

pub fn collection_request(name: &str) -> Value {
    json!({ "name": name, "description": null })
}

pub fn drip_request(rate: u32, days: &[u8]) -> Value {
    json!({ "enabled": true, "rate": rate, "days": days })
}

pub fn drip_disabled() -> Value {
    json!({ "enabled": false })
}

/// The first `count` sample passages, cycling when more are asked for.
pub fn verses_request(count: usize, collection_ids: &[Uuid]) -> Value {
    let passages: Vec<Value> = PASSAGES
        .iter()
        .cycle()
        .take(count)
        .map(|(reference, text)| json!({ "reference": reference, "text": text }))
        .collect();
    json!({ "passages": passages, "collection_ids": collection_ids })
}

pub fn queue_request(scope: Value, mode: &str) -> Value {
    json!({ "scope": scope, "mode": mode })
}

pub fn library_scope() -> Value {
    json!({ "type": "library" })
}

pub fn starred_scope() -> Value {
    json!({ "type": "starred" })
}

pub fn collection_scope(collection_id: Uuid) -> Value {
    json!({ "type": "collection", "collection_id": collection_id })
}

pub fn pinned_request(verse_id: Uuid) -> Value {
    json!({
        "scope": library_scope(),
        "entry": { "type": "pinned", "verse_id": verse_id },
    })
}

pub fn continue_request(collection_id: Uuid, verse_id: Uuid) -> Value {
    json!({
        "scope": collection_scope(collection_id),
        "entry": { "type": "continue_from", "collection_id": collection_id, "verse_id": verse_id },
    })
}

pub fn grade_request(verse_id: Uuid, grade: Option<u8>) -> Value {
    match grade {
        Some(grade) => json!({ "verse_id": verse_id, "grade": grade }),
        None => json!({ "verse_id": verse_id }),
    }
}
