//! Verse reference helpers.

use std::cmp::Ordering;

const BOOKS: [&str; 66] = [
    "Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy", "Joshua", "Judges", "Ruth",
    "1 Samuel", "2 Samuel", "1 Kings", "2 Kings", "1 Chronicles", "2 Chronicles", "Ezra",
    "Nehemiah", "Esther", "Job", "Psalms", "Proverbs", "Ecclesiastes", "Song of Solomon",
    "Isaiah", "Jeremiah", "Lamentations", "Ezekiel", "Daniel", "Hosea", "Joel", "Amos",
    "Obadiah", "Jonah", "Micah", "Nahum", "Habakkuk", "Zephaniah", "Haggai", "Zechariah",
    "Malachi", "Matthew", "Mark", "Luke", "John", "Acts", "Romans", "1 Corinthians",
    "2 Corinthians", "Galatians", "Ephesians", "Philippians", "Colossians", "1 Thessalonians",
    "2 Thessalonians", "1 Timothy", "2 Timothy", "Titus", "Philemon", "Hebrews", "James",
    "1 Peter", "2 Peter", "1 John", "2 John", "3 John", "Jude", "Revelation",
];

/// Book part of a reference: everything before the first whitespace that
/// is followed by a digit. "1 Corinthians 13:4-7" gives "1 Corinthians".
pub fn book_name(reference: &str) -> &str {
    let reference = reference.trim();
    for (i, c) in reference.char_indices().skip(1) {
        if !c.is_whitespace() {
            continue;
        }
        let rest = reference[i..].trim_start();
        if rest.as_bytes().first().is_some_and(u8::is_ascii_digit) {
            return reference[..i].trim_end();
        }
    }
    reference
}

/// Canonical position of a book, 0-based.
pub fn book_index(book: &str) -> Option<usize> {
    let book = if book == "Psalm" { "Psalms" } else { book };
    BOOKS.iter().position(|name| *name == book)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Parsed<'a> {
    book: &'a str,
    chapter: u32,
    verse: u32,
}

fn parse(reference: &str) -> Parsed<'_> {
    let book = book_name(reference);
    let rest = reference.trim()[book.len()..].trim_start();
    let leading_number = |s: &str| -> Option<u32> {
        let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
        digits.parse().ok()
    };
    let chapter = leading_number(rest).unwrap_or(0);
    let verse = rest
        .split_once(':')
        .and_then(|(_, after)| leading_number(after))
        .unwrap_or(0);
    Parsed {
        book,
        chapter,
        verse,
    }
}

/// Order two references by canonical book, then chapter, then verse.
/// Unknown books sort after all known ones.
pub fn compare_references(a: &str, b: &str) -> Ordering {
    let a = parse(a);
    let b = parse(b);
    let rank = |p: &Parsed<'_>| book_index(p.book).unwrap_or(usize::MAX);
    rank(&a)
        .cmp(&rank(&b))
        .then(a.chapter.cmp(&b.chapter))
        .then(a.verse.cmp(&b.verse))
}
