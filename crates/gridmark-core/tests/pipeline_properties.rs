#![cfg(feature = "test-utils")]

use gridmark_config::RenderConfig;
use gridmark_core::proptest_strategies::*;
use gridmark_core::*;
use proptest::prelude::*;

fn is_sentinel(c: char) -> bool {
    ('\u{E000}'..='\u{E004}').contains(&c)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_rows_never_exceed_width(source in arb_markup(), width in arb_width()) {
        let mut doc = Document::from_source(&source, &RenderConfig::default()).unwrap();
        for line in doc.layout(width).unwrap() {
            prop_assert!(
                line.content_width() <= width,
                "row '{}' exceeds width {}",
                line.plain_text(), width
            );
        }
    }

    #[test]
    fn prop_tokenize_is_deterministic(source in arb_markup()) {
        let tokenizer = Tokenizer::new(&RenderConfig::default());
        prop_assert_eq!(tokenizer.tokenize(&source), tokenizer.tokenize(&source));
    }

    #[test]
    fn prop_no_sentinel_reaches_the_grid(source in arb_markup(), width in arb_width()) {
        let mut doc = Document::from_source(&source, &RenderConfig::default()).unwrap();
        let rows = doc.layout(width).unwrap().len();

        let mut grid = CellGrid::new(width, rows.max(1));
        let out = doc.paint(Viewport::full(&grid), &mut grid).unwrap();

        for row in grid.to_lines() {
            prop_assert!(!row.chars().any(is_sentinel), "sentinel in row '{}'", row);
        }
        for entry in &out.registry {
            prop_assert!(!entry.element.text.chars().any(is_sentinel));
        }
    }

    #[test]
    fn prop_registry_stays_inside_viewport(
        source in arb_markup(),
        width in arb_width(),
        (x, y, w, h) in (1usize..5, 1usize..5, 1usize..40, 1usize..10),
        scroll in 0usize..6,
    ) {
        let mut doc = Document::from_source(&source, &RenderConfig::default()).unwrap();
        doc.layout(width).unwrap();
        doc.scroll_to(scroll, h);

        let mut grid = CellGrid::new(x + w, y + h);
        let out = doc.paint(Viewport::new(x, y, w, h), &mut grid).unwrap();

        prop_assert!(out.next_row <= y + h);
        for entry in &out.registry {
            let el = &entry.element;
            prop_assert!(el.width > 0);
            prop_assert!(el.x >= x && el.x + el.width <= x + w);
            prop_assert!(el.y >= y && el.y < y + h);
        }
    }
}
