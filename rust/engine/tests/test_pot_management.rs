use holdem_engine::pot::{split_evenly, PotManager};

#[test]
fn heads_up_simple_side_pot() {
    let pm = PotManager::from_contributions([500, 1000]);
    assert_eq!(pm.main_pot(), 1000);
    assert_eq!(pm.side_pots(), &[500]);
    assert_eq!(pm.pots()[1].eligible, vec![1]);
}

#[test]
fn equal_stacks_no_side_pot() {
    let pm = PotManager::from_contributions([1000, 1000]);
    assert_eq!(pm.main_pot(), 2000);
    assert!(pm.side_pots().is_empty());
}

#[test]
fn folded_chips_stay_in_the_pot_without_eligibility() {
    let pm = PotManager::layered(&[100, 400, 400, 250], &[true, true, true, false]);
    assert_eq!(pm.main_pot(), 400);
    assert_eq!(pm.pots()[0].eligible, vec![0, 1, 2]);
    assert_eq!(pm.side_pots(), &[750]);
    assert_eq!(pm.pots()[1].eligible, vec![1, 2]);
    assert_eq!(pm.total(), 1150);
}

#[test]
fn odd_chip_goes_to_first_listed_winner() {
    assert_eq!(split_evenly(101, &[2, 0]), vec![(2, 51), (0, 50)]);
    assert!(split_evenly(100, &[]).is_empty());
}
