use lexi_language::{LanguageTable, MATCH_THRESHOLD, resolve};
use proptest::prelude::*;

// ── Exact codes and display names always resolve with full confidence ─────

proptest! {
    #[test]
    fn exact_code_or_name_resolves_to_itself(index in 0usize..7, upper in any::<bool>()) {
        let table = LanguageTable::builtin();
        let entry = &table.supported()[index];

        for candidate in [entry.code.clone(), entry.name.clone()] {
            let input = if upper { candidate.to_uppercase() } else { candidate };
            let result = resolve(&input, &table, "en");
            prop_assert_eq!(result.code.as_deref(), Some(entry.code.as_str()));
            prop_assert!((result.confidence - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn exact_localized_name_resolves_to_its_code(index in 0usize..7) {
        let table = LanguageTable::builtin();
        let code = table.supported()[index].code.clone();
        let name = table.localized_name(&code, "ru").unwrap().to_owned();

        let result = resolve(&name, &table, "ru");
        prop_assert_eq!(result.code.as_deref(), Some(code.as_str()));
        prop_assert!((result.confidence - 100.0).abs() < f64::EPSILON);
    }
}

// ── Results are either a confident hit or a clean miss ─────────────────────

proptest! {
    #[test]
    fn result_is_hit_above_threshold_or_zero_miss(input in "\\PC{0,12}") {
        let table = LanguageTable::builtin();
        let result = resolve(&input, &table, "ru");
        match result.code {
            Some(code) => {
                prop_assert!(table.is_supported(&code));
                prop_assert!(result.confidence >= MATCH_THRESHOLD);
                prop_assert!(result.confidence <= 100.0);
            }
            None => prop_assert!(result.confidence.abs() < f64::EPSILON),
        }
    }

    #[test]
    fn digits_never_match_a_language(input in "[0-9]{1,10}") {
        let table = LanguageTable::builtin();
        prop_assert!(!resolve(&input, &table, "en").is_match());
    }
}
