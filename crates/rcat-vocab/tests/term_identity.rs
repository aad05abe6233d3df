use proptest::prelude::*;

use rcat_vocab::VocabularyStore;

proptest! {
    // Adding the same term twice always resolves to the same identifier,
    // regardless of what else was added in between.
    #[test]
    fn term_identity_is_idempotent(
        term in "[a-zA-Z0-9 ]{1,20}",
        others in prop::collection::vec("[a-zA-Z0-9 ]{1,20}", 0..10),
    ) {
        prop_assume!(!term.trim().is_empty());

        let mut store = VocabularyStore::new();
        let first = store.add_term("categories", &term, None);
        for other in &others {
            store.add_term("categories", other, None);
        }
        let second = store.add_term("categories", &term, None);

        prop_assert_eq!(first, second);
        prop_assert_eq!(store.resolve("categories", &term).unwrap(), first);
    }

    // Identifier assignment depends only on insertion order.
    #[test]
    fn identifiers_are_reproducible(
        terms in prop::collection::vec("[a-zA-Z0-9]{1,12}", 1..20),
    ) {
        let mut first = VocabularyStore::new();
        let mut second = VocabularyStore::new();
        for term in &terms {
            first.add_term("v", term, None);
        }
        for term in &terms {
            second.add_term("v", term, None);
        }
        for term in &terms {
            prop_assert_eq!(
                first.resolve("v", term).unwrap(),
                second.resolve("v", term).unwrap()
            );
        }
    }
}
