use std::collections::HashSet;

use holdem_engine::cards::{full_deck, Card};
use holdem_engine::deck::Deck;

#[test]
fn deck_reset_has_52_unique_cards() {
    let mut deck = Deck::new_with_seed(42);
    deck.reset();
    let mut set = HashSet::new();
    for i in 0..52 {
        let c = deck.deal_card().expect("should have 52 cards");
        assert!(set.insert(c), "card {c} duplicated at position {i}");
    }
    assert!(deck.deal_card().is_none(), "after 52 cards, deck should be empty");
}

#[test]
fn shuffle_is_deterministic_with_same_seed() {
    let mut d1 = Deck::new_with_seed(12345);
    let mut d2 = Deck::new_with_seed(12345);
    d1.shuffle();
    d2.shuffle();
    let a: Vec<Card> = (0..10).map(|_| d1.deal_card().unwrap()).collect();
    let b: Vec<Card> = (0..10).map(|_| d2.deal_card().unwrap()).collect();
    assert_eq!(a, b, "same seed must yield identical order");
}

#[test]
fn shuffle_differs_with_different_seed() {
    let mut d1 = Deck::new_with_seed(1);
    let mut d2 = Deck::new_with_seed(2);
    d1.shuffle();
    d2.shuffle();
    let a: Vec<Card> = (0..10).map(|_| d1.deal_card().unwrap()).collect();
    let b: Vec<Card> = (0..10).map(|_| d2.deal_card().unwrap()).collect();
    assert_ne!(a, b, "different seeds should produce different orders");
}

#[test]
fn stacked_deck_deals_in_given_order() {
    let cards: Vec<Card> = ["As", "Kd", "2c"].iter().map(|c| c.parse().unwrap()).collect();
    let mut deck = Deck::stacked(cards.clone());
    assert_eq!(deck.remaining(), 3);
    assert_eq!(deck.burn_card(), Some(cards[0]));
    assert_eq!(deck.deal_card(), Some(cards[1]));
    assert_eq!(deck.deal_card(), Some(cards[2]));
    assert_eq!(deck.deal_card(), None);
}

#[test]
fn card_codes_round_trip_through_display_and_serde() {
    for card in full_deck() {
        let code = card.to_string();
        assert_eq!(code.len(), 2);
        assert_eq!(code.parse::<Card>().unwrap(), card);
    }
    let json = serde_json::to_string(&"Th".parse::<Card>().unwrap()).unwrap();
    assert_eq!(json, "\"Th\"");
    assert!("1x".parse::<Card>().is_err());
    assert!("Ahh".parse::<Card>().is_err());
}
