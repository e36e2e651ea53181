use lexi_story::generation::{ParsedStory, extract_key_words, parse_story_response};
use proptest::prelude::*;

fn render(parsed: &ParsedStory) -> String {
    let mut text = parsed.story_text.clone();
    for (index, choice) in parsed.choices.iter().enumerate() {
        text.push('\n');
        text.push_str(&format!("{}. {choice}", index + 1));
    }
    text
}

// ── Story parsing is stable on its own output ──────────────────────────────

proptest! {
    #[test]
    fn reparsing_rendered_output_is_identity(input in "[a-zA-Z0-9 .\n]{0,80}") {
        let parsed = parse_story_response(&input);
        let reparsed = parse_story_response(&render(&parsed));
        prop_assert_eq!(reparsed, parsed);
    }

    #[test]
    fn well_formed_turn_round_trips(
        lines in prop::collection::vec("[A-Za-z][a-z ,!]{0,20}[a-z!]", 1..4),
        choices in prop::collection::vec("[A-Za-z][a-z ]{0,15}[a-z]", 0..3),
    ) {
        let expected = ParsedStory {
            story_text: lines.join("\n"),
            choices,
        };
        prop_assert_eq!(parse_story_response(&render(&expected)), expected);
    }

    #[test]
    fn parser_never_panics(input in "\\PC{0,120}") {
        let parsed = parse_story_response(&input);
        prop_assert!(!parsed.story_text.starts_with('\n'));
    }
}

// ── Key words are few, long, and alphabetic ────────────────────────────────

proptest! {
    #[test]
    fn key_words_are_bounded_and_well_formed(input in "\\PC{0,200}") {
        let words = extract_key_words(&input);
        prop_assert!(words.len() <= 2);
        for word in &words {
            prop_assert!(word.chars().count() > 5);
            prop_assert!(word.chars().all(char::is_alphabetic));
        }
    }
}
