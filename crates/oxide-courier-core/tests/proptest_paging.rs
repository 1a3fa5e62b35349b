use oxide_courier_core::pager::{split_pages, HEADER_RESERVE, MAX_PAGES, MAX_TEXT_LENGTH};
use proptest::prelude::*;

const SHORT_LEN: usize = MAX_TEXT_LENGTH - HEADER_RESERVE;

fn long_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(any::<char>(), MAX_TEXT_LENGTH..MAX_TEXT_LENGTH * 4)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Stripping the labels and joining the pages gives back the input.
    #[test]
    fn pages_rebuild_the_original(text in long_text()) {
        let pages = split_pages(&text).expect("well under the page limit");
        let rebuilt: String = pages.iter().map(|page| page.body.as_str()).collect();
        prop_assert_eq!(rebuilt, text);
    }

    /// Page count is the ceiling of length over the usable page size.
    #[test]
    fn page_count_matches_formula(text in long_text()) {
        let len = text.chars().count();
        let pages = split_pages(&text).expect("well under the page limit");
        prop_assert_eq!(pages.len(), len.div_ceil(SHORT_LEN));
        prop_assert!(pages.iter().all(|page| page.total == pages.len()));
        prop_assert!(pages.iter().all(|page| page.body.chars().count() <= SHORT_LEN));
    }

    /// Every rendered page starts with its own label.
    #[test]
    fn rendered_pages_are_labeled(text in long_text()) {
        let pages = split_pages(&text).expect("well under the page limit");
        for (i, page) in pages.iter().enumerate() {
            let label = format!("[{}/{}] ", i + 1, pages.len());
            prop_assert!(page.render().starts_with(&label));
            prop_assert_eq!(page.index, i + 1);
        }
    }

    /// Anything above the page limit is rejected with all bodies attached.
    #[test]
    fn over_limit_is_rejected(extra in 1usize..SHORT_LEN * 2) {
        let text = "w".repeat(SHORT_LEN * MAX_PAGES + extra);
        let err = split_pages(&text).expect_err("over the limit");
        match err {
            oxide_courier_core::CourierError::PagingLimitExceeded { pages } => {
                prop_assert!(pages.len() > MAX_PAGES);
                prop_assert_eq!(pages.concat(), text);
            }
            other => prop_assert!(false, "unexpected error {}", other),
        }
    }
}
