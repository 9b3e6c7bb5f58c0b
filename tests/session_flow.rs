use chrono::NaiveDate;
use sales_core::errors::LedgerError;
use sales_core::ledger::{Entry, Ledger};
use sales_core::session::{EditState, SalesSession};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn fresh_session() -> SalesSession {
    SalesSession::new(Ledger::new("Flow"))
}

#[test]
fn add_increases_total_by_exactly_quantity_times_price() {
    let mut session = fresh_session();
    let before = session.ledger().total_for_date(day(5));
    session.add_entry(day(5), "Pen", 7, 12).unwrap();
    let after = session.ledger().total_for_date(day(5));
    assert_eq!(after - before, 7 * 12);
}

#[test]
fn rejected_add_leaves_the_ledger_unchanged() {
    let mut session = fresh_session();
    session.add_entry(day(5), "Pen", 3, 10).unwrap();

    for (name, quantity, price) in [("", 1, 1), ("Pen", 0, 1), ("Pen", 1, 0)] {
        let err = session
            .add_entry(day(5), name, quantity, price)
            .expect_err("invalid fields must be rejected");
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    assert_eq!(session.ledger().entries_for(day(5)).len(), 1);
    assert_eq!(session.ledger().total_for_date(day(5)), 30);
}

#[test]
fn delete_removes_exactly_the_indexed_entry() {
    let mut session = fresh_session();
    session.add_entry(day(5), "Pen", 3, 10).unwrap();
    session.add_entry(day(5), "Notebook", 2, 45).unwrap();
    session.add_entry(day(5), "Eraser", 1, 5).unwrap();
    session.add_entry(day(7), "Stapler", 1, 120).unwrap();

    session.delete_entry(day(5), 1).unwrap();

    let names: Vec<&str> = session
        .ledger()
        .entries_for(day(5))
        .iter()
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(names, ["Pen", "Eraser"]);
    assert_eq!(session.ledger().entries_for(day(7)).len(), 1);
}

#[test]
fn edit_roundtrip_replaces_in_place() {
    let mut session = fresh_session();
    session.add_entry(day(5), "Pen", 3, 10).unwrap();
    session.add_entry(day(5), "Notebook", 2, 45).unwrap();
    session.add_entry(day(5), "Eraser", 1, 5).unwrap();

    let staged = session.begin_edit(day(5), 1).unwrap();
    assert_eq!(staged, Entry::new("Notebook", 2, 45));
    session.commit_edit("Diary", 4, 60).unwrap();

    let entries = session.ledger().entries_for(day(5));
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].name, "Pen");
    assert_eq!(entries[1], Entry::new("Diary", 4, 60));
    assert_eq!(entries[2].name, "Eraser");
    assert_eq!(session.edit_state(), EditState::Idle);
}

#[test]
fn totals_match_reference_values() {
    let mut session = fresh_session();
    assert_eq!(session.ledger().total_for_date(day(9)), 0);

    session.add_entry(day(9), "Pen", 2, 100).unwrap();
    session.add_entry(day(9), "Notebook", 1, 50).unwrap();
    assert_eq!(session.ledger().total_for_date(day(9)), 250);
}

#[test]
fn repeated_product_scenario() {
    let mut session = fresh_session();
    session.add_entry(day(5), "Pen", 3, 10).unwrap();
    session.add_entry(day(5), "Pen", 2, 10).unwrap();
    assert_eq!(session.ledger().total_for_date(day(5)), 50);

    session.delete_entry(day(5), 0).unwrap();
    let entries = session.ledger().entries_for(day(5));
    assert_eq!(entries, [Entry::new("Pen", 2, 10)]);
    assert_eq!(session.ledger().total_for_date(day(5)), 20);
}

#[test]
fn date_guard_accepts_today_and_rejects_tomorrow() {
    let mut session = fresh_session();
    let today = day(15);

    session.select_date(today, today).unwrap();
    assert_eq!(session.selected_date(), Some(today));

    // Dates with no entries yet are still selectable as long as they are not
    // in the future.
    session.select_date(day(2), today).unwrap();

    let err = session
        .select_date(day(16), today)
        .expect_err("tomorrow must be rejected");
    assert!(matches!(err, LedgerError::FutureDate(_)));
    assert_eq!(session.selected_date(), Some(day(2)));
}

#[test]
fn delete_invalidates_stale_indices() {
    let mut session = fresh_session();
    session.add_entry(day(5), "Pen", 3, 10).unwrap();

    session.delete_entry(day(5), 0).unwrap();
    let err = session
        .delete_entry(day(5), 0)
        .expect_err("index cached across a delete is stale");
    assert!(matches!(err, LedgerError::NotFound(_)));
}
