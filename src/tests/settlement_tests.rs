use crate::core::balances::Balances;
use crate::core::constants::SETTLEMENT_EPSILON;
use crate::core::settlement::plan_settlements;
use crate::tests::approx_eq;

fn balances(entries: &[(&str, f64)]) -> Balances {
    entries.iter().map(|(u, b)| (u.to_string(), *b)).collect()
}

fn outgoing(transfers: &[crate::core::models::settlement::Transfer], user: &str) -> f64 {
    transfers.iter().filter(|t| t.from == user).map(|t| t.amount).sum()
}

fn incoming(transfers: &[crate::core::models::settlement::Transfer], user: &str) -> f64 {
    transfers.iter().filter(|t| t.to == user).map(|t| t.amount).sum()
}

#[test]
fn test_single_creditor_collects_from_every_debtor() {
    let transfers = plan_settlements(&balances(&[("a", 200.0), ("b", -100.0), ("c", -100.0)]));

    assert_eq!(transfers.len(), 2);
    assert!(transfers.iter().all(|t| t.to == "a" && approx_eq(t.amount, 100.0, 1e-9)));
    assert_eq!(transfers[0].from, "b");
    assert_eq!(transfers[1].from, "c");
}

#[test]
fn test_largest_debtor_pays_first() {
    let transfers = plan_settlements(&balances(&[("a", 50.0), ("b", -10.0), ("c", -40.0)]));

    assert_eq!(transfers.len(), 2);
    assert_eq!((transfers[0].from.as_str(), transfers[0].to.as_str()), ("c", "a"));
    assert!(approx_eq(transfers[0].amount, 40.0, 1e-9));
    assert_eq!((transfers[1].from.as_str(), transfers[1].to.as_str()), ("b", "a"));
    assert!(approx_eq(transfers[1].amount, 10.0, 1e-9));
}

#[test]
fn test_balances_within_epsilon_are_ignored() {
    let transfers = plan_settlements(&balances(&[("a", 0.005), ("b", -0.005), ("c", 0.0)]));
    assert!(transfers.is_empty());

    assert!(plan_settlements(&Balances::new()).is_empty());
}

#[test]
fn test_many_to_many_settles_every_position() {
    let input = balances(&[
        ("a", 70.0),
        ("b", 30.5),
        ("c", -25.25),
        ("d", -45.0),
        ("e", -30.25),
        ("f", 0.0),
    ]);
    let transfers = plan_settlements(&input);

    let nonzero = input.values().filter(|b| b.abs() > SETTLEMENT_EPSILON).count();
    assert!(transfers.len() <= nonzero - 1);

    for (user, balance) in &input {
        if *balance > SETTLEMENT_EPSILON {
            assert!(approx_eq(incoming(&transfers, user), *balance, SETTLEMENT_EPSILON));
            assert_eq!(outgoing(&transfers, user), 0.0);
        } else if *balance < -SETTLEMENT_EPSILON {
            assert!(approx_eq(outgoing(&transfers, user), -*balance, SETTLEMENT_EPSILON));
            assert_eq!(incoming(&transfers, user), 0.0);
        }
    }
    assert!(transfers.iter().all(|t| t.amount > SETTLEMENT_EPSILON && t.from != t.to));
}

#[test]
fn test_planning_is_deterministic_with_ties() {
    let input = balances(&[("a", 20.0), ("b", 20.0), ("c", -20.0), ("d", -20.0)]);

    let first = plan_settlements(&input);
    let second = plan_settlements(&input);
    assert_eq!(first, second);

    // Equal positions keep map order.
    assert_eq!((first[0].from.as_str(), first[0].to.as_str()), ("c", "a"));
    assert_eq!((first[1].from.as_str(), first[1].to.as_str()), ("d", "b"));
}

#[test]
fn test_thirds_leave_no_residual_transfer() {
    let share = 100.0 / 3.0;
    let input = balances(&[("a", 2.0 * share), ("b", -share), ("c", -share)]);
    let transfers = plan_settlements(&input);

    assert_eq!(transfers.len(), 2);
    let total: f64 = transfers.iter().map(|t| t.amount).sum();
    assert!(approx_eq(total, 2.0 * share, 1e-9));
}
