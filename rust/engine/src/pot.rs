/// One layer of the pot and the seats that can win it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pot {
    pub amount: u32,
    pub eligible: Vec<usize>,
}

/// Splits per-seat contributions into a main pot and side pots.
///
/// Each distinct contribution level among live seats closes a layer; folded
/// seats add chips to every layer they reached but are never eligible.
///
/// ```
/// use holdem_engine::pot::PotManager;
///
/// let pm = PotManager::layered(&[300, 1000, 1000], &[true, true, false]);
/// assert_eq!(pm.main_pot(), 900);
/// assert_eq!(pm.side_pots(), &[1400]);
/// assert_eq!(pm.pots()[1].eligible, vec![1]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PotManager {
    pots: Vec<Pot>,
    side_amounts: Vec<u32>,
}

impl PotManager {
    /// Layers contributions with every seat still live.
    pub fn from_contributions<I: IntoIterator<Item = u32>>(contributions: I) -> Self {
        let contributions: Vec<u32> = contributions.into_iter().collect();
        let live = vec![true; contributions.len()];
        Self::layered(&contributions, &live)
    }

    pub fn layered(contributions: &[u32], live: &[bool]) -> Self {
        let mut levels: Vec<u32> = contributions
            .iter()
            .zip(live)
            .filter(|(&c, &l)| l && c > 0)
            .map(|(&c, _)| c)
            .collect();
        levels.sort_unstable();
        levels.dedup();

        let mut pots: Vec<Pot> = Vec::with_capacity(levels.len());
        let mut floor = 0u32;
        for &level in &levels {
            let amount = contributions
                .iter()
                .map(|&c| c.min(level).saturating_sub(floor))
                .sum();
            let eligible = (0..contributions.len())
                .filter(|&i| live[i] && contributions[i] >= level)
                .collect();
            if amount > 0 {
                pots.push(Pot { amount, eligible });
            }
            floor = level;
        }

        // Chips above the highest live level belong to nobody else; fold them into the last layer.
        let leftover: u32 = contributions.iter().map(|&c| c.saturating_sub(floor)).sum();
        if leftover > 0 {
            match pots.last_mut() {
                Some(last) => last.amount += leftover,
                None => pots.push(Pot {
                    amount: leftover,
                    eligible: Vec::new(),
                }),
            }
        }

        let side_amounts = pots.iter().skip(1).map(|p| p.amount).collect();
        Self { pots, side_amounts }
    }

    pub fn main_pot(&self) -> u32 {
        self.pots.first().map(|p| p.amount).unwrap_or(0)
    }

    pub fn side_pots(&self) -> &[u32] {
        &self.side_amounts
    }

    pub fn pots(&self) -> &[Pot] {
        &self.pots
    }

    pub fn total(&self) -> u32 {
        self.pots.iter().map(|p| p.amount).sum()
    }
}

/// Divides `amount` evenly between `winners`, odd chips going to the
/// winners listed first.
pub fn split_evenly(amount: u32, winners: &[usize]) -> Vec<(usize, u32)> {
    if winners.is_empty() {
        return Vec::new();
    }
    let n = winners.len() as u32;
    let share = amount / n;
    let odd = (amount % n) as usize;
    winners
        .iter()
        .enumerate()
        .map(|(i, &seat)| (seat, share + u32::from(i < odd)))
        .collect()
}
