//! Property tests for list ordering and search.

use chrono::{Days, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use touchbase_core::{
    order, search, visible, Cadence, Contact, ContactBook, ListQuery, NewContact, OrderMode,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn contact_strategy() -> impl Strategy<Value = Contact> {
    ("[A-Za-z]{1,8}", any::<bool>(), 1u32..30, 0u64..120).prop_map(
        |(name, is_favorite, every, days_ago)| {
            let last = today() - Days::new(days_ago);
            Contact {
                id: String::new(),
                name,
                birthday: None,
                is_favorite,
                cadence: Cadence::days(every).unwrap(),
                initial_contact: last,
                last_contact: last,
                reminder: true,
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            }
        },
    )
}

fn contacts_strategy() -> impl Strategy<Value = Vec<Contact>> {
    prop::collection::vec(contact_strategy(), 0..20).prop_map(|mut contacts| {
        for (i, c) in contacts.iter_mut().enumerate() {
            c.id = format!("c{i}");
        }
        contacts
    })
}

fn sorted_ids(contacts: &[Contact]) -> Vec<String> {
    let mut ids: Vec<String> = contacts.iter().map(|c| c.id.clone()).collect();
    ids.sort();
    ids
}

proptest! {
    #[test]
    fn alphabetical_is_a_sorted_permutation(contacts in contacts_strategy()) {
        let out = order(&contacts, OrderMode::Alphabetical, today());
        prop_assert_eq!(sorted_ids(&out), sorted_ids(&contacts));
        for pair in out.windows(2) {
            prop_assert!(pair[0].name.to_lowercase() <= pair[1].name.to_lowercase());
        }
    }

    #[test]
    fn backwards_mirrors_alphabetical_keys(contacts in contacts_strategy()) {
        let forward: Vec<String> = order(&contacts, OrderMode::Alphabetical, today())
            .iter()
            .map(|c| c.name.to_lowercase())
            .collect();
        let mut backward: Vec<String> = order(&contacts, OrderMode::Backwards, today())
            .iter()
            .map(|c| c.name.to_lowercase())
            .collect();
        backward.reverse();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn favorites_are_exactly_the_favorites(contacts in contacts_strategy()) {
        let out = order(&contacts, OrderMode::Favorites, today());
        let expected: Vec<&str> = contacts
            .iter()
            .filter(|c| c.is_favorite)
            .map(|c| c.id.as_str())
            .collect();
        let got: Vec<&str> = out.iter().map(|c| c.id.as_str()).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn due_date_keeps_only_due_contacts_soonest_first(contacts in contacts_strategy()) {
        let out = order(&contacts, OrderMode::DueDate, today());
        let expected = contacts.iter().filter(|c| c.is_overdue(today())).count();
        prop_assert_eq!(out.len(), expected);
        for pair in out.windows(2) {
            prop_assert!(pair[0].next_due_date().unwrap() <= pair[1].next_due_date().unwrap());
        }
    }

    #[test]
    fn search_matches_case_insensitive_substrings(
        contacts in contacts_strategy(),
        needle in "[a-zA-Z]{1,3}",
    ) {
        let out = search(&contacts, &needle);
        let lowered = needle.to_lowercase();
        let expected = contacts
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&lowered))
            .count();
        prop_assert_eq!(out.len(), expected);
        prop_assert!(out.iter().all(|c| c.name.to_lowercase().contains(&lowered)));
    }

    #[test]
    fn visible_without_search_is_plain_order(contacts in contacts_strategy()) {
        let query = ListQuery::ordered(OrderMode::Backwards);
        prop_assert_eq!(
            visible(&contacts, &query, today()),
            order(&contacts, OrderMode::Backwards, today())
        );
    }
}

#[test]
fn empty_search_text_shows_nothing() {
    let mut book = ContactBook::new();
    book.create_contact(NewContact::new("Anna", Cadence::default(), today()))
        .unwrap();
    let query = ListQuery {
        order: OrderMode::Alphabetical,
        search: Some(String::new()),
    };
    assert!(book.visible(&query, today()).is_empty());
}
