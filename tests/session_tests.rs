use faca_catalog::session::DeleteConfirm;

#[test]
fn test_starts_idle() {
    let confirm = DeleteConfirm::new();
    assert_eq!(confirm.pending(), None);
}

#[test]
fn test_request_marks_pending() {
    let mut confirm = DeleteConfirm::new();
    confirm.request(7);
    assert_eq!(confirm.pending(), Some(7));
}

#[test]
fn test_request_retargets_pending_id() {
    let mut confirm = DeleteConfirm::new();
    confirm.request(7);
    confirm.request(9);
    assert_eq!(confirm.pending(), Some(9));
}

#[test]
fn test_confirm_takes_pending_and_resets() {
    let mut confirm = DeleteConfirm::new();
    confirm.request(7);

    assert_eq!(confirm.confirm(), Some(7));
    assert_eq!(confirm.pending(), None);

    // A second confirm has nothing to act on
    assert_eq!(confirm.confirm(), None);
}

#[test]
fn test_confirm_while_idle_is_none() {
    let mut confirm = DeleteConfirm::new();
    assert_eq!(confirm.confirm(), None);
}

#[test]
fn test_cancel_resets_to_idle() {
    let mut confirm = DeleteConfirm::new();
    confirm.request(3);
    confirm.cancel();
    assert_eq!(confirm.pending(), None);
    assert_eq!(confirm.confirm(), None);
}
