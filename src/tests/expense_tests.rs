use crate::core::constants::{EXPENSE_RECORDED, SETTLEMENT_EPSILON, SPLIT_SETTLED, SPLIT_TOLERANCE};
use crate::core::errors::{ErrorKind, LedgerError};
use crate::tests::{approx_eq, create_test_service, group_with, register, test_date};
use std::sync::Arc;

#[tokio::test]
async fn test_record_expense_splits_equally_and_marks_payer_paid() {
    let service = create_test_service();
    let alice = register(&service, "alice").await;
    let bob = register(&service, "bob").await;
    let carol = register(&service, "carol").await;
    let group = group_with(&service, "Trip", &[&alice, &bob, &carol]).await;

    let expense_id = service
        .record_group_expense(&group.id, &alice.id, 100.0, "Dinner".to_string(), None, test_date())
        .await
        .unwrap();

    let expense = service.get_expense(&expense_id).await.unwrap();
    assert_eq!(expense.expense.paid_by, alice.id);
    assert_eq!(expense.splits.len(), 3);
    assert!(approx_eq(expense.share_total(), 100.0, SPLIT_TOLERANCE));
    for split in &expense.splits {
        assert!(approx_eq(split.share_amount, 100.0 / 3.0, 1e-9));
        assert_eq!(split.is_paid, split.user_id == alice.id);
    }

    let logs = service.get_app_logs().await.unwrap();
    assert_eq!(logs.last().unwrap().action, EXPENSE_RECORDED);
}

#[tokio::test]
async fn test_single_payer_scenario() {
    let service = create_test_service();
    let a = register(&service, "a").await;
    let b = register(&service, "b").await;
    let c = register(&service, "c").await;
    let group = group_with(&service, "Flat", &[&a, &b, &c]).await;

    service
        .record_group_expense(&group.id, &a.id, 300.0, "Rent".to_string(), None, test_date())
        .await
        .unwrap();

    let balances = service.compute_balances(&group.id).await.unwrap();
    assert!(approx_eq(balances[&a.id], 200.0, 1e-9));
    assert!(approx_eq(balances[&b.id], -100.0, 1e-9));
    assert!(approx_eq(balances[&c.id], -100.0, 1e-9));

    let settlement = service.compute_group_settlement(&group.id).await.unwrap();
    assert_eq!(settlement.len(), 2);
    for transfer in &settlement {
        assert_eq!(transfer.to, a.id);
        assert_eq!(transfer.to_name, "a");
        assert!(approx_eq(transfer.amount, 100.0, SETTLEMENT_EPSILON));
    }
    let mut payers: Vec<&str> = settlement.iter().map(|t| t.from_name.as_str()).collect();
    payers.sort();
    assert_eq!(payers, vec!["b", "c"]);
}

#[tokio::test]
async fn test_two_payers_scenario() {
    let service = create_test_service();
    let a = register(&service, "a").await;
    let b = register(&service, "b").await;
    let c = register(&service, "c").await;
    let group = group_with(&service, "Flat", &[&a, &b, &c]).await;

    service
        .record_group_expense(&group.id, &a.id, 90.0, "Groceries".to_string(), None, test_date())
        .await
        .unwrap();
    service
        .record_group_expense(&group.id, &b.id, 30.0, "Snacks".to_string(), None, test_date())
        .await
        .unwrap();

    let balances = service.compute_balances(&group.id).await.unwrap();
    assert!(approx_eq(balances[&a.id], 50.0, 1e-9));
    assert!(approx_eq(balances[&b.id], -10.0, 1e-9));
    assert!(approx_eq(balances[&c.id], -40.0, 1e-9));
    assert!(approx_eq(balances.values().sum::<f64>(), 0.0, SPLIT_TOLERANCE));

    let settlement = service.compute_group_settlement(&group.id).await.unwrap();
    assert_eq!(settlement.len(), 2);
    assert_eq!((settlement[0].from.as_str(), settlement[0].to.as_str()), (c.id.as_str(), a.id.as_str()));
    assert!(approx_eq(settlement[0].amount, 40.0, SETTLEMENT_EPSILON));
    assert_eq!((settlement[1].from.as_str(), settlement[1].to.as_str()), (b.id.as_str(), a.id.as_str()));
    assert!(approx_eq(settlement[1].amount, 10.0, SETTLEMENT_EPSILON));
}

#[tokio::test]
async fn test_pair_scenario() {
    let service = create_test_service();
    let a = register(&service, "a").await;
    let b = register(&service, "b").await;
    let group = group_with(&service, "Pair", &[&a, &b]).await;

    service
        .record_group_expense(&group.id, &a.id, 50.0, "Taxi".to_string(), None, test_date())
        .await
        .unwrap();

    let settlement = service.compute_group_settlement(&group.id).await.unwrap();
    assert_eq!(settlement.len(), 1);
    assert_eq!(settlement[0].from, b.id);
    assert_eq!(settlement[0].to, a.id);
    assert!(approx_eq(settlement[0].amount, 25.0, SETTLEMENT_EPSILON));
}

#[tokio::test]
async fn test_non_positive_amount_is_rejected_without_writes() {
    let service = create_test_service();
    let a = register(&service, "a").await;
    let b = register(&service, "b").await;
    let group = group_with(&service, "Pair", &[&a, &b]).await;

    for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let result = service
            .record_group_expense(&group.id, &a.id, amount, "Bad".to_string(), None, test_date())
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    assert!(service.list_group_expenses(&group.id).await.unwrap().is_empty());
    let balances = service.compute_balances(&group.id).await.unwrap();
    assert!(balances.values().all(|b| *b == 0.0));
}

#[tokio::test]
async fn test_malformed_amount_and_title_are_rejected() {
    let service = create_test_service();
    let a = register(&service, "a").await;
    let group = group_with(&service, "Solo", &[&a]).await;

    let too_precise = service
        .record_group_expense(&group.id, &a.id, 10.005, "Coffee".to_string(), None, test_date())
        .await;
    assert!(matches!(too_precise, Err(LedgerError::InvalidInput(ref field, _)) if field == "amount"));

    let too_large = service
        .record_group_expense(&group.id, &a.id, 2_000_000.0, "Car".to_string(), None, test_date())
        .await;
    assert!(matches!(too_large, Err(LedgerError::InvalidInput(ref field, _)) if field == "amount"));

    let blank_title = service
        .record_group_expense(&group.id, &a.id, 10.0, "   ".to_string(), None, test_date())
        .await;
    assert!(matches!(blank_title, Err(LedgerError::InvalidInput(ref field, _)) if field == "title"));

    // Cents that are not exact in binary still count as two decimals.
    service
        .record_group_expense(&group.id, &a.id, 0.29, "Gum".to_string(), Some("  ".to_string()), test_date())
        .await
        .unwrap();
    let expenses = service.list_group_expenses(&group.id).await.unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].expense.description, None);
}

#[tokio::test]
async fn test_expense_text_keeps_brackets_and_line_breaks() {
    let service = create_test_service();
    let a = register(&service, "a").await;
    let b = register(&service, "b").await;
    let group = group_with(&service, "Office", &[&a, &b]).await;

    let created = service
        .record_group_expense_detailed(
            &group.id,
            &a.id,
            42.0,
            "Dinner [work] <team> {q3}".to_string(),
            Some("milk\neggs\tbread".to_string()),
            test_date(),
        )
        .await
        .unwrap();
    assert_eq!(created.expense.title, "Dinner [work] <team> {q3}");
    assert_eq!(created.expense.description.as_deref(), Some("milk\neggs\tbread"));

    let multi_line_title = service
        .record_group_expense(&group.id, &a.id, 5.0, "Lunch\nagain".to_string(), None, test_date())
        .await;
    assert!(matches!(multi_line_title, Err(LedgerError::InvalidInput(ref field, _)) if field == "title"));

    let bell = service
        .record_group_expense(&group.id, &a.id, 5.0, "Lunch".to_string(), Some("ring\u{7}".to_string()), test_date())
        .await;
    assert!(matches!(bell, Err(LedgerError::InvalidInput(ref field, _)) if field == "description"));

    assert_eq!(service.list_group_expenses(&group.id).await.unwrap().len(), 1);
}

#[test]
fn test_storage_boundary_rejects_unbalanced_shares() {
    use crate::core::models::{expense::NewExpense, group::Membership};
    use crate::core::splits::{check_split_sum, split_equally};
    use chrono::Utc;

    let members: Vec<Membership> = ["a", "b", "c"]
        .iter()
        .map(|id| Membership {
            group_id: "g".to_string(),
            user_id: id.to_string(),
            joined_at: Utc::now(),
        })
        .collect();
    let draft = NewExpense {
        group_id: "g".to_string(),
        paid_by: "a".to_string(),
        amount: 100.0,
        title: "Rent".to_string(),
        description: None,
        date: test_date(),
    };

    let mut entry = split_equally(&draft, &members, Utc::now()).unwrap();
    assert!(check_split_sum(&entry).is_ok());

    entry.splits[0].share_amount += 0.5;
    assert!(matches!(
        check_split_sum(&entry),
        Err(LedgerError::InvalidSplit { expected, .. }) if expected == 100.0
    ));
}

#[tokio::test]
async fn test_non_member_payer_is_rejected() {
    let service = create_test_service();
    let a = register(&service, "a").await;
    let b = register(&service, "b").await;
    let outsider = register(&service, "outsider").await;
    let group = group_with(&service, "Pair", &[&a, &b]).await;

    let result = service
        .record_group_expense(&group.id, &outsider.id, 40.0, "Lunch".to_string(), None, test_date())
        .await;
    let err = result.unwrap_err();
    assert_eq!(err, LedgerError::NotGroupMember(outsider.id.clone()));
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(service.list_group_expenses(&group.id).await.unwrap().is_empty());
    assert!(
        !service
            .get_app_logs()
            .await
            .unwrap()
            .iter()
            .any(|log| log.action == EXPENSE_RECORDED)
    );
}

#[tokio::test]
async fn test_unknown_group_is_not_found() {
    let service = create_test_service();
    let a = register(&service, "a").await;

    let result = service
        .record_group_expense("missing", &a.id, 10.0, "Lunch".to_string(), None, test_date())
        .await;
    assert_eq!(result.unwrap_err(), LedgerError::GroupNotFound("missing".to_string()));

    let balances = service.compute_balances("missing").await;
    assert_eq!(balances.unwrap_err().kind(), ErrorKind::NotFound);
    let settlement = service.compute_group_settlement("missing").await;
    assert_eq!(settlement.unwrap_err().kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_settle_split_is_idempotent() {
    let service = create_test_service();
    let a = register(&service, "a").await;
    let b = register(&service, "b").await;
    let c = register(&service, "c").await;
    let group = group_with(&service, "Flat", &[&a, &b, &c]).await;

    let expense_id = service
        .record_group_expense(&group.id, &a.id, 300.0, "Rent".to_string(), None, test_date())
        .await
        .unwrap();

    service.settle_split(&expense_id, &b.id).await.unwrap();
    let after_first = service.compute_balances(&group.id).await.unwrap();
    assert!(approx_eq(after_first[&a.id], 100.0, 1e-9));
    assert!(approx_eq(after_first[&b.id], 0.0, 1e-9));
    assert!(approx_eq(after_first[&c.id], -100.0, 1e-9));

    service.settle_split(&expense_id, &b.id).await.unwrap();
    let after_second = service.compute_balances(&group.id).await.unwrap();
    assert_eq!(after_first, after_second);

    // The payer's own share starts paid; settling it changes nothing.
    service.settle_split(&expense_id, &a.id).await.unwrap();
    assert_eq!(service.compute_balances(&group.id).await.unwrap(), after_first);

    let settled_logs = service
        .get_app_logs()
        .await
        .unwrap()
        .into_iter()
        .filter(|log| log.action == SPLIT_SETTLED)
        .count();
    assert_eq!(settled_logs, 1);

    let group_logs = service.get_group_logs(&group.id).await.unwrap();
    assert_eq!(group_logs.last().unwrap().action, SPLIT_SETTLED);
    assert_eq!(group_logs.last().unwrap().details["expense_id"], expense_id.as_str());

    let settlement = service.compute_group_settlement(&group.id).await.unwrap();
    assert_eq!(settlement.len(), 1);
    assert_eq!(settlement[0].from, c.id);
}

#[tokio::test]
async fn test_settle_split_unknown_targets_are_not_found() {
    let service = create_test_service();
    let a = register(&service, "a").await;
    let b = register(&service, "b").await;
    let outsider = register(&service, "outsider").await;
    let group = group_with(&service, "Pair", &[&a, &b]).await;
    let expense_id = service
        .record_group_expense(&group.id, &a.id, 20.0, "Cab".to_string(), None, test_date())
        .await
        .unwrap();

    let missing_expense = service.settle_split("nope", &b.id).await.unwrap_err();
    assert_eq!(missing_expense, LedgerError::ExpenseNotFound("nope".to_string()));

    let missing_split = service.settle_split(&expense_id, &outsider.id).await.unwrap_err();
    assert!(matches!(missing_split, LedgerError::SplitNotFound { .. }));
    assert_eq!(missing_split.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_membership_changes_do_not_resplit_past_expenses() {
    let service = create_test_service();
    let a = register(&service, "a").await;
    let b = register(&service, "b").await;
    let c = register(&service, "c").await;
    let group = group_with(&service, "Club", &[&a, &b]).await;

    let first = service
        .record_group_expense(&group.id, &a.id, 60.0, "Balls".to_string(), None, test_date())
        .await
        .unwrap();
    service.join_group_by_code(&group.invite_code, &c.id).await.unwrap();
    let second = service
        .record_group_expense(&group.id, &a.id, 60.0, "Court".to_string(), None, test_date())
        .await
        .unwrap();

    assert_eq!(service.get_expense(&first).await.unwrap().splits.len(), 2);
    assert_eq!(service.get_expense(&second).await.unwrap().splits.len(), 3);

    let balances = service.compute_balances(&group.id).await.unwrap();
    assert!(approx_eq(balances[&a.id], 70.0, 1e-9));
    assert!(approx_eq(balances[&b.id], -50.0, 1e-9));
    assert!(approx_eq(balances[&c.id], -20.0, 1e-9));

    // A member who leaves keeps their outstanding shares.
    service.leave_group(&group.id, &c.id).await.unwrap();
    let balances = service.compute_balances(&group.id).await.unwrap();
    assert!(approx_eq(balances[&c.id], -20.0, 1e-9));
    assert!(approx_eq(balances.values().sum::<f64>(), 0.0, SPLIT_TOLERANCE));
}

#[tokio::test]
async fn test_concurrent_expenses_are_fully_split() {
    let service = Arc::new(create_test_service());
    let a = register(&service, "a").await;
    let b = register(&service, "b").await;
    let c = register(&service, "c").await;
    let group = group_with(&service, "Flat", &[&a, &b, &c]).await;

    let (first, second) = tokio::join!(
        service.record_group_expense(&group.id, &a.id, 45.0, "Gas".to_string(), None, test_date()),
        service.record_group_expense(&group.id, &b.id, 75.5, "Power".to_string(), None, test_date()),
    );
    let first = first.unwrap();
    let second = second.unwrap();

    for id in [&first, &second] {
        let expense = service.get_expense(id).await.unwrap();
        assert_eq!(expense.splits.len(), 3);
        assert!(approx_eq(expense.share_total(), expense.expense.amount, SPLIT_TOLERANCE));
    }
    let balances = service.compute_balances(&group.id).await.unwrap();
    assert!(approx_eq(balances.values().sum::<f64>(), 0.0, SPLIT_TOLERANCE));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_join_sees_consistent_member_snapshot() {
    let service = Arc::new(create_test_service());
    let a = register(&service, "a").await;
    let b = register(&service, "b").await;
    let group = group_with(&service, "Party", &[&a, &b]).await;

    let mut newcomers = Vec::new();
    for i in 0..5 {
        newcomers.push(register(&service, &format!("guest{}", i)).await);
    }

    let mut handles = Vec::new();
    for (i, guest) in newcomers.iter().enumerate() {
        let svc = service.clone();
        let group_id = group.id.clone();
        let payer = if i % 2 == 0 { a.id.clone() } else { b.id.clone() };
        handles.push(tokio::spawn(async move {
            svc.record_group_expense(&group_id, &payer, 12.0, format!("Round {}", i), None, test_date())
                .await
        }));
        let svc = service.clone();
        let code = group.invite_code.clone();
        let guest_id = guest.id.clone();
        handles.push(tokio::spawn(async move {
            svc.join_group_by_code(&code, &guest_id).await.map(|m| m.user_id)
        }));
    }
    for handle in futures::future::join_all(handles).await {
        handle.unwrap().unwrap();
    }

    let expenses = service.list_group_expenses(&group.id).await.unwrap();
    assert_eq!(expenses.len(), 5);
    let mut previous = 0;
    for expense in &expenses {
        // Members only join, so later expenses never see fewer members.
        assert!(expense.splits.len() >= previous);
        assert!((2..=7).contains(&expense.splits.len()));
        assert!(approx_eq(expense.share_total(), 12.0, SPLIT_TOLERANCE));
        previous = expense.splits.len();
    }
    let balances = service.compute_balances(&group.id).await.unwrap();
    assert_eq!(balances.len(), 7);
    assert!(approx_eq(balances.values().sum::<f64>(), 0.0, SPLIT_TOLERANCE));
}
