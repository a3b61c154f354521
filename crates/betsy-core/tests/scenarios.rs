//! End-to-end conversation scenarios against small shoe and wine catalogs.

use std::sync::Arc;

use betsy_core::catalog::Catalog;
use betsy_core::matcher::Matcher;
use betsy_core::models::{ProductRecord, TurnOutcome};
use betsy_core::session::{Assistant, AssistantSettings, SessionContext};
use betsy_core::tokenize::{tokenize, Tokenizer};
use serde_json::json;

fn records(value: serde_json::Value) -> Vec<ProductRecord> {
    serde_json::from_value(value).expect("fixture records deserialize")
}

fn shoe_records() -> Vec<ProductRecord> {
    records(json!([
        { "id": 1, "name": "Green Sneakers", "price": 89, "stock": 5, "onSale": false,
          "attributes": [{ "name": "Color", "value": "Green" }, { "name": "Size", "value": 42 }] },
        { "id": 2, "name": "Blue Running Shoes", "price": 99, "stock": 5, "onSale": true,
          "attributes": [{ "name": "Color", "value": "Blue" }, { "name": "Size", "value": 42 }] },
        { "id": 3, "name": "Green Sandals", "price": 49, "stock": 5, "onSale": false,
          "attributes": [{ "name": "Color", "value": "Green" }, { "name": "Size", "value": 41 }] },
        { "id": 4, "name": "Black Sneakers", "price": 95, "stock": 5, "onSale": true,
          "attributes": [{ "name": "Color", "value": "Black" }, { "name": "Size", "value": 42 }] },
        { "id": 5, "name": "Red Sneakers", "price": 85, "stock": 5, "onSale": false,
          "attributes": [{ "name": "Color", "value": "Red" }, { "name": "Size", "value": 43 }] },
        { "id": 6, "name": "Grey Sneakers", "price": 70, "stock": 0, "onSale": true,
          "attributes": [{ "name": "Color", "value": "Grey" }, { "name": "Size", "value": 43 }] }
    ]))
}

fn wine_records() -> Vec<ProductRecord> {
    records(json!([
        { "id": 1, "name": "Chardonnay Reserve 2021", "sku": "WINE-CH-2021", "price": 35,
          "description": "A crisp Chardonnay with notes of apple, pear, and subtle oak.",
          "categories": ["Wine", "White Wine", "Chardonnay"], "tags": ["white", "dry", "oak-aged"],
          "attributes": [{ "name": "Volume", "value": "750ml" }, { "name": "ABV", "value": "13%" },
                         { "name": "Vintage", "value": 2021 }],
          "related": [2, 3], "stock": 45, "onSale": true },
        { "id": 3, "name": "Cabernet Sauvignon Estate 2019", "sku": "WINE-CS-2019", "price": 55,
          "description": "Rich and full-bodied Cabernet with blackberry and oak flavors.",
          "categories": ["Wine", "Red Wine", "Cabernet Sauvignon"], "tags": ["red", "full-bodied", "aged"],
          "attributes": [{ "name": "Volume", "value": "750ml" }, { "name": "ABV", "value": "14%" },
                         { "name": "Vintage", "value": 2019 }],
          "related": [2, 5], "stock": 25, "onSale": false },
        { "id": 4, "name": "Rosé Summer Blend 2022", "sku": "WINE-ROSE-2022", "price": 28,
          "description": "Light and refreshing rosé with strawberry and floral notes.",
          "categories": ["Wine", "Rosé"], "tags": ["rosé", "light", "summer"],
          "attributes": [{ "name": "Volume", "value": "750ml" }, { "name": "ABV", "value": "11.5%" },
                         { "name": "Vintage", "value": 2022 }],
          "related": [1, 6], "stock": 60, "onSale": true },
        { "id": 6, "name": "Merlot Reserve 2018", "sku": "WINE-MR-2018", "price": 48,
          "description": "Velvety Merlot with plum, chocolate, and spice notes.",
          "categories": ["Wine", "Red Wine", "Merlot"], "tags": ["red", "smooth", "reserve"],
          "attributes": [{ "name": "Volume", "value": "750ml" }, { "name": "ABV", "value": "13.5%" },
                         { "name": "Vintage", "value": 2018 }],
          "related": [2, 3], "stock": 20, "onSale": false },
        { "id": 7, "name": "Sparkling Brut NV", "sku": "WINE-SP-NV", "price": 39,
          "description": "A lively sparkling wine with citrus, green apple, and brioche notes.",
          "categories": ["Wine", "Sparkling Wine"], "tags": ["sparkling", "celebration", "brut"],
          "attributes": [{ "name": "Volume", "value": "750ml" }, { "name": "ABV", "value": "12%" },
                         { "name": "Vintage", "value": "NV" }],
          "related": [4, 8], "stock": 50, "onSale": true },
        { "id": 8, "name": "Shiraz Bold 2020", "sku": "WINE-SH-2020", "price": 50,
          "description": "Bold Shiraz with rich dark fruit, pepper, and smoky oak.",
          "categories": ["Wine", "Red Wine", "Shiraz"], "tags": ["red", "bold", "spicy"],
          "attributes": [{ "name": "Volume", "value": "750ml" }, { "name": "ABV", "value": "14.5%" },
                         { "name": "Vintage", "value": 2020 }],
          "related": [3, 6], "stock": 35, "onSale": false },
        { "id": 9, "name": "Dessert Wine Late Harvest 2017", "sku": "WINE-DW-2017", "price": 60,
          "description": "Sweet and luscious dessert wine with honey and apricot notes.",
          "categories": ["Wine", "Dessert Wine"], "tags": ["sweet", "dessert", "luxury"],
          "attributes": [{ "name": "Volume", "value": "375ml" }, { "name": "ABV", "value": "11%" },
                         { "name": "Vintage", "value": 2017 }],
          "related": [4, 7], "stock": 15, "onSale": false },
        { "id": 10, "name": "Organic Natural Red 2021", "sku": "WINE-OR-2021", "price": 38,
          "description": "Organic red wine made with minimal intervention, vibrant berry flavors.",
          "categories": ["Wine", "Red Wine", "Organic"], "tags": ["organic", "natural", "red"],
          "attributes": [{ "name": "Volume", "value": "750ml" }, { "name": "ABV", "value": "12.7%" },
                         { "name": "Vintage", "value": 2021 }],
          "related": [6, 8], "stock": 22, "onSale": true }
    ]))
}

fn assistant_for(records: Vec<ProductRecord>) -> Assistant {
    let catalog = Catalog::new(records).expect("fixture catalog is valid");
    Assistant::new(Arc::new(catalog), AssistantSettings::default())
}

fn shoes() -> Assistant {
    assistant_for(shoe_records())
}

fn wines() -> Assistant {
    assistant_for(wine_records())
}

fn ids(records: &[ProductRecord]) -> Vec<u64> {
    records.iter().map(|r| r.id).collect()
}

/// Ids returned by a single fresh-session query.
fn ask(assistant: &Assistant, query: &str) -> (TurnOutcome, Vec<u64>) {
    let mut session = assistant.start_session();
    let turn = assistant.submit(&mut session, query).expect("non-blank query");
    (turn.outcome, ids(&turn.results))
}

const QUERIES: &[&str] = &[
    "green sneakers",
    "I need the BLUE running shoes in size 42",
    "anything on sale?",
    "size 43",
    "price $49",
    "comfy sandals",
    "black or red sneakers",
    "do you have it in size xl",
    "show me something",
    "vintage 2021 chardonnay",
    "abv 14% red",
    "oak",
];

#[test]
fn test_tokenization_is_idempotent() {
    for q in QUERIES {
        let once = tokenize(q);
        assert_eq!(tokenize(&once.join(" ")), once, "query {:?}", q);
    }
}

#[test]
fn test_stop_words_never_reach_filters_or_free_text() {
    let tokenizer = Tokenizer::new();
    for assistant in [shoes(), wines()] {
        for q in QUERIES {
            let ex = assistant.interpret(q, &SessionContext::default());
            for t in &ex.free_text {
                assert!(!tokenizer.is_stop_word(t), "{:?}: free text {:?}", q, t);
            }
            let filters = &ex.filters;
            let mut values: Vec<&str> = [&filters.color, &filters.size, &filters.price]
                .into_iter()
                .flatten()
                .map(|s| s.as_str())
                .collect();
            values.extend(filters.attributes.iter().map(|a| a.value.as_str()));
            if let Some(term) = &filters.product_type {
                values.extend(term.words());
            }
            for v in values {
                assert!(!tokenizer.is_stop_word(v), "{:?}: filter value {:?}", q, v);
            }
        }
    }
}

#[test]
fn test_filters_and_free_text_or() {
    let matcher = Matcher::default();
    let strict = |assistant: &Assistant, q: &str| {
        let ex = assistant.interpret(q, &SessionContext::default());
        ids(&matcher.find_extracted(assistant.catalog(), &ex))
    };

    let s = shoes();
    assert_eq!(strict(&s, "green sneakers"), vec![1]);
    assert_eq!(strict(&s, "sneakers size 42"), vec![1, 4]);
    assert_eq!(strict(&s, "what's on sale?"), vec![2, 4]);
    assert_eq!(strict(&s, "price $49"), vec![3]);

    let w = wines();
    // Free-text tokens are OR-ed.
    assert_eq!(strict(&w, "oak"), vec![1, 3, 8]);
    assert_eq!(strict(&w, "oak honey"), vec![1, 3, 8, 9]);
    assert_eq!(strict(&w, "oak berry"), vec![1, 3, 4, 8, 10]);
    // Everything else is AND-ed with them.
    assert_eq!(strict(&w, "shiraz oak"), vec![8]);
    assert_eq!(strict(&w, "merlot oak"), Vec::<u64>::new());
    assert_eq!(strict(&w, "vintage 2021 oak"), vec![1]);
}

#[test]
fn test_sale_query_ignores_carried_term() {
    let a = shoes();
    let mut session = a.start_session();
    a.submit(&mut session, "sneakers").unwrap();
    let turn = a.submit(&mut session, "on sale").unwrap();
    assert_eq!(turn.outcome, TurnOutcome::Match);
    assert_eq!(ids(&turn.results), vec![2, 4]);

    // An explicit term still narrows a sale query.
    let turn = a.submit(&mut session, "sneakers on sale").unwrap();
    assert_eq!(ids(&turn.results), vec![4]);
}

#[test]
fn test_case_insensitive() {
    let a = shoes();
    assert_eq!(ask(&a, "GREEN SNEAKERS"), ask(&a, "green sneakers"));
    let w = wines();
    assert_eq!(ask(&w, "VINTAGE 2021"), ask(&w, "vintage 2021"));
}

#[test]
fn test_scenario_a_green_sneakers() {
    let (outcome, found) = ask(&shoes(), "green sneakers");
    assert_eq!(outcome, TurnOutcome::Match);
    assert_eq!(found, vec![1]);
}

#[test]
fn test_scenario_b_size_without_context_is_no_match() {
    let records: Vec<ProductRecord> = shoe_records().into_iter().filter(|r| r.id != 5).collect();
    let a = assistant_for(records);
    let mut session = a.start_session();
    let turn = a.submit(&mut session, "size 43").unwrap();
    assert_eq!(turn.outcome, TurnOutcome::NoMatch);
    assert!(turn.results.is_empty());
    assert_eq!(turn.bot_message.text, a.settings().apology);
}

#[test]
fn test_scenario_c_relaxation_respects_last_term() {
    // Sneakers only in size 43, something else in size 42.
    let records: Vec<ProductRecord> = shoe_records()
        .into_iter()
        .filter(|r| matches!(r.id, 2 | 5))
        .collect();
    let a = assistant_for(records);
    let mut session = a.start_session();

    let first = a.submit(&mut session, "sneakers").unwrap();
    assert_eq!(first.outcome, TurnOutcome::Match);
    assert_eq!(session.context().last_search_term.as_deref(), Some("sneakers"));

    let second = a.submit(&mut session, "size 42").unwrap();
    assert_eq!(second.outcome, TurnOutcome::NoMatch);
    assert!(second.results.is_empty(), "unrelated size-42 items leaked");
}

#[test]
fn test_scenario_c_relaxation_with_matching_term() {
    let a = shoes();
    let mut session = a.start_session();
    a.submit(&mut session, "sneakers").unwrap();

    let turn = a.submit(&mut session, "red size 42").unwrap();
    assert_eq!(turn.outcome, TurnOutcome::FallbackMatch);
    assert_eq!(ids(&turn.results), vec![1, 4]);
    assert_eq!(turn.bot_message.label.as_deref(), Some("size 42 sneakers"));
}

#[test]
fn test_context_refines_next_turn() {
    let a = shoes();
    let mut session = a.start_session();
    a.submit(&mut session, "sneakers").unwrap();
    let turn = a.submit(&mut session, "size 42").unwrap();
    assert_eq!(turn.outcome, TurnOutcome::Match);
    assert_eq!(ids(&turn.results), vec![1, 4]);
    // Carried terms do not overwrite context.
    assert_eq!(session.context().last_search_term.as_deref(), Some("sneakers"));
}

#[test]
fn test_scenario_d_on_sale() {
    let (outcome, found) = ask(&wines(), "on sale");
    assert_eq!(outcome, TurnOutcome::Match);
    assert_eq!(found, vec![1, 4, 7, 10]);

    let (_, found) = ask(&shoes(), "what's on sale?");
    assert_eq!(found, vec![2, 4]);
}

#[test]
fn test_out_of_stock_never_returned() {
    let (_, found) = ask(&shoes(), "grey sneakers");
    assert!(!found.contains(&6));
}

#[test]
fn test_wine_attribute_pairs_and_free_text() {
    let w = wines();
    assert_eq!(ask(&w, "vintage 2021").1, vec![1, 10]);
    assert_eq!(ask(&w, "abv 14%").1, vec![3]);
    assert_eq!(ask(&w, "price $48").1, vec![6]);
    assert_eq!(ask(&w, "oak").1, vec![1, 3, 8]);
    assert_eq!(ask(&w, "375ml").1, vec![9]);
    assert_eq!(ask(&w, "wine-sp-nv").1, vec![7]);
}

#[test]
fn test_bare_numeric_relaxation() {
    let a = shoes();
    let mut session = a.start_session();
    let turn = a.submit(&mut session, "42.0").unwrap();
    assert_eq!(turn.outcome, TurnOutcome::FallbackMatch);
    assert_eq!(ids(&turn.results), vec![1, 2, 4]);
    assert_eq!(turn.bot_message.label.as_deref(), Some("attribute value 42.0"));
}

#[test]
fn test_stop_word_only_query_matches_nothing() {
    let a = shoes();
    let mut session = a.start_session();
    a.submit(&mut session, "sneakers").unwrap();
    let turn = a.submit(&mut session, "show me something please").unwrap();
    assert_eq!(turn.outcome, TurnOutcome::NoMatch);
}

#[test]
fn test_reset_round_trip() {
    let a = shoes();
    let mut session = a.start_session();
    a.submit(&mut session, "sneakers").unwrap();
    a.submit(&mut session, "size 42").unwrap();

    a.reset(&mut session);
    let first = a.submit(&mut session, "size 42").unwrap();
    a.reset(&mut session);
    let second = a.submit(&mut session, "size 42").unwrap();

    assert_eq!(first, second);
    assert_eq!(ids(&first.results), vec![1, 2, 4]);
    assert_eq!(session.messages().len(), 3);
}
