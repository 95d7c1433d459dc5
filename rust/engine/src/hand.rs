use std::cmp::Ordering;

use crate::cards::{Card, Suit};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HandStrength {
    pub category: Category,
    // kickers: ordered high -> low for tiebreaks
    pub kickers: [u8; 5],
}

impl Ord for HandStrength {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_hands(self, other)
    }
}

impl PartialOrd for HandStrength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best five-card strength among two hole cards and five board cards.
pub fn evaluate_hand(cards: &[Card; 7]) -> HandStrength {
    let mut rank_counts = [0u8; 15]; // 2..14 used
    let mut rank_mask: u16 = 0;
    let mut suit_masks = [0u16; 4];
    let mut suit_counts = [0u8; 4];
    for &c in cards.iter() {
        let r = c.rank as u8;
        let s = suit_index(c.suit);
        rank_counts[r as usize] += 1;
        rank_mask |= 1 << r;
        suit_masks[s] |= 1 << r;
        suit_counts[s] += 1;
    }

    let flush_mask = suit_counts
        .iter()
        .position(|&n| n >= 5)
        .map(|s| suit_masks[s]);

    if let Some(high) = flush_mask.and_then(straight_high) {
        return strength(Category::StraightFlush, &[high]);
    }

    // Ranks grouped by multiplicity, biggest group first, then highest rank.
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .rev()
        .filter(|&r| rank_counts[r as usize] > 0)
        .map(|r| (rank_counts[r as usize], r))
        .collect();
    groups.sort_by(|a, b| b.cmp(a));

    let (top_count, top_rank) = groups[0];
    let second = groups.get(1).copied().unwrap_or((0, 0));

    if top_count == 4 {
        let kicker = highest_excluding(&groups, &[top_rank]);
        return strength(Category::FourOfAKind, &[top_rank, kicker]);
    }
    if top_count == 3 && second.0 >= 2 {
        return strength(Category::FullHouse, &[top_rank, second.1]);
    }
    if let Some(mask) = flush_mask {
        return strength(Category::Flush, &top_ranks(mask, 5));
    }
    if let Some(high) = straight_high(rank_mask) {
        return strength(Category::Straight, &[high]);
    }
    if top_count == 3 {
        let mut k = vec![top_rank];
        k.extend(kickers_excluding(&groups, &[top_rank], 2));
        return strength(Category::ThreeOfAKind, &k);
    }
    if top_count == 2 && second.0 == 2 {
        let kicker = highest_excluding(&groups, &[top_rank, second.1]);
        return strength(Category::TwoPair, &[top_rank, second.1, kicker]);
    }
    if top_count == 2 {
        let mut k = vec![top_rank];
        k.extend(kickers_excluding(&groups, &[top_rank], 3));
        return strength(Category::OnePair, &k);
    }
    strength(Category::HighCard, &top_ranks(rank_mask, 5))
}

pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => a.kickers.cmp(&b.kickers),
        ord => ord,
    }
}

fn strength(category: Category, ranks: &[u8]) -> HandStrength {
    let mut kickers = [0u8; 5];
    for (slot, &r) in kickers.iter_mut().zip(ranks) {
        *slot = r;
    }
    HandStrength { category, kickers }
}

fn suit_index(s: Suit) -> usize {
    match s {
        Suit::Clubs => 0,
        Suit::Diamonds => 1,
        Suit::Hearts => 2,
        Suit::Spades => 3,
    }
}

fn straight_high(mask: u16) -> Option<u8> {
    // Ace also plays low
    let m = if mask & (1 << 14) != 0 { mask | (1 << 1) } else { mask };
    (5..=14u8).rev().find(|&high| {
        let window = 0b1_1111u16 << (high - 4);
        m & window == window
    })
}

fn top_ranks(mask: u16, n: usize) -> Vec<u8> {
    (2..=14u8)
        .rev()
        .filter(|&r| mask & (1 << r) != 0)
        .take(n)
        .collect()
}

fn kickers_excluding(groups: &[(u8, u8)], used: &[u8], n: usize) -> Vec<u8> {
    let mut ranks: Vec<u8> = groups
        .iter()
        .map(|&(_, r)| r)
        .filter(|r| !used.contains(r))
        .collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    ranks.truncate(n);
    ranks
}

fn highest_excluding(groups: &[(u8, u8)], used: &[u8]) -> u8 {
    kickers_excluding(groups, used, 1)
        .first()
        .copied()
        .unwrap_or(0)
}
