use holdem_engine::cards::Card;
use holdem_engine::hand::{compare_hands, evaluate_hand, Category};

fn seven(codes: &str) -> [Card; 7] {
    let cards: Vec<Card> = codes
        .split_whitespace()
        .map(|c| c.parse().expect("valid card code"))
        .collect();
    cards.try_into().expect("seven cards")
}

#[test]
fn detects_royal_flush() {
    let hs = evaluate_hand(&seven("Th Jh Qh Kh Ah 2c 3d"));
    assert_eq!(hs.category, Category::StraightFlush);
    assert_eq!(hs.kickers[0], 14);
}

#[test]
fn wheel_straight_plays_ace_low() {
    let hs = evaluate_hand(&seven("Ac 2d 3h 4s 5c 9d Kh"));
    assert_eq!(hs.category, Category::Straight);
    assert_eq!(hs.kickers[0], 5);
}

#[test]
fn category_ordering_is_correct() {
    let quads = evaluate_hand(&seven("Ac Ad Ah As Kc Qd 2h"));
    let full_house = evaluate_hand(&seven("Kc Kd Kh Qc Qd 2h 3s"));
    assert_eq!(quads.category, Category::FourOfAKind);
    assert_eq!(full_house.category, Category::FullHouse);
    assert!(compare_hands(&quads, &full_house).is_gt());
}

#[test]
fn two_trips_make_a_full_house() {
    let hs = evaluate_hand(&seven("9c 9d 9h 4c 4d 4h Ks"));
    assert_eq!(hs.category, Category::FullHouse);
    assert_eq!(&hs.kickers[..2], &[9, 4]);
}

#[test]
fn straight_beats_three_of_a_kind() {
    let straight = evaluate_hand(&seven("5c 6h 7c 8h 9d 2s 3c"));
    let trips = evaluate_hand(&seven("Qc Qh Qd 2s 3c 4h 9d"));
    assert_eq!(trips.category, Category::ThreeOfAKind);
    assert!(compare_hands(&straight, &trips).is_gt());
}

#[test]
fn flush_beats_straight_and_is_detected() {
    let flush = evaluate_hand(&seven("2h 7h Jh Qh 9h Ac Kd"));
    let straight = evaluate_hand(&seven("5c 6h 7c 8h 9d 2s 3c"));
    assert_eq!(flush.category, Category::Flush);
    assert_eq!(flush.kickers, [12, 11, 9, 7, 2]);
    assert!(compare_hands(&flush, &straight).is_gt());
}

#[test]
fn two_pair_kicker_considers_third_pair() {
    let hs = evaluate_hand(&seven("Ac Ad Kc Kd Qc Qd 2s"));
    assert_eq!(hs.category, Category::TwoPair);
    assert_eq!(&hs.kickers[..3], &[14, 13, 12]);
}

#[test]
fn pair_vs_high_card() {
    let pair = evaluate_hand(&seven("Ac Ah 2s 3d 8c 9d Jh"));
    let high = evaluate_hand(&seven("Ac Kh 9s 8d 7c 3d 2h"));
    assert_eq!(pair.category, Category::OnePair);
    assert_eq!(high.category, Category::HighCard);
    assert!(compare_hands(&pair, &high).is_gt());
}

#[test]
fn equal_hands_tie_on_the_board() {
    let a = evaluate_hand(&seven("2c 3d Ah Kh Qh Jh 9s"));
    let b = evaluate_hand(&seven("2d 3s Ah Kh Qh Jh 9s"));
    assert!(compare_hands(&a, &b).is_eq());
}
