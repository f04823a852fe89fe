use std::cell::Cell;

use super::*;
use crate::test_support::FakeHost;

fn viewer_cell(viewer: Viewer) -> (Rc<Cell<Viewer>>, Rc<dyn Fn() -> Viewer>) {
    let cell = Rc::new(Cell::new(viewer));
    let read = cell.clone();
    (cell, Rc::new(move || read.get()))
}

fn as_host(host: &Rc<FakeHost>) -> Rc<dyn PageHost> {
    host.clone()
}

#[test]
fn public_page_is_allowed() {
    let host = FakeHost::on_page("stats");
    let guard = Guard::new("./index.html");
    let (_, recheck) = viewer_cell(Viewer::SIGNED_OUT);

    let outcome = guard.enforce(&as_host(&host), &PageCatalog::pickem(), Viewer::SIGNED_OUT, recheck);
    assert_eq!(outcome, GuardOutcome::Allowed);
    assert!(host.navigations.borrow().is_empty());
}

#[test]
fn visible_tab_leaves_auth_only_page_immediately() {
    let host = FakeHost::on_page("picks");
    let guard = Guard::new("./index.html");
    let (_, recheck) = viewer_cell(Viewer::SIGNED_OUT);

    let outcome = guard.enforce(&as_host(&host), &PageCatalog::pickem(), Viewer::SIGNED_OUT, recheck);
    assert_eq!(outcome, GuardOutcome::Redirected);
    assert_eq!(*host.navigations.borrow(), vec!["./index.html".to_owned()]);
}

#[test]
fn hidden_tab_defers_until_visible() {
    let host = FakeHost::on_page("picks");
    host.set_visibility(Visibility::Hidden);
    let guard = Guard::new("./index.html");
    let (_, recheck) = viewer_cell(Viewer::SIGNED_OUT);

    let outcome = guard.enforce(&as_host(&host), &PageCatalog::pickem(), Viewer::SIGNED_OUT, recheck);
    assert_eq!(outcome, GuardOutcome::Deferred);
    assert!(host.navigations.borrow().is_empty());

    host.set_visibility(Visibility::Visible);
    assert_eq!(host.navigations.borrow().len(), 1);
}

#[test]
fn repeated_sign_outs_while_hidden_schedule_once() {
    let host = FakeHost::on_page("picks");
    host.set_visibility(Visibility::Hidden);
    let guard = Guard::new("./index.html");
    let catalog = PageCatalog::pickem();

    for _ in 0..3 {
        let (_, recheck) = viewer_cell(Viewer::SIGNED_OUT);
        guard.enforce(&as_host(&host), &catalog, Viewer::SIGNED_OUT, recheck);
    }
    host.set_visibility(Visibility::Visible);
    assert_eq!(host.navigations.borrow().len(), 1);
}

#[test]
fn deferred_exit_is_cancelled_if_access_returns() {
    let host = FakeHost::on_page("picks");
    host.set_visibility(Visibility::Hidden);
    let guard = Guard::new("./index.html");
    let catalog = PageCatalog::pickem();
    let (viewer, recheck) = viewer_cell(Viewer::SIGNED_OUT);

    guard.enforce(&as_host(&host), &catalog, Viewer::SIGNED_OUT, recheck.clone());
    viewer.set(Viewer::signed_in(true));
    host.set_visibility(Visibility::Visible);
    assert!(host.navigations.borrow().is_empty());

    // A later loss of access can schedule again.
    host.set_visibility(Visibility::Hidden);
    viewer.set(Viewer::SIGNED_OUT);
    let outcome = guard.enforce(&as_host(&host), &catalog, Viewer::SIGNED_OUT, recheck);
    assert_eq!(outcome, GuardOutcome::Deferred);
}

#[test]
fn commissioner_page_requires_elevation() {
    let host = FakeHost::on_page("commissioner");
    let guard = Guard::new("./index.html");
    let (_, recheck) = viewer_cell(Viewer::signed_in(true));

    let elevated = Viewer { signed_in: true, elevated: true };
    let catalog = PageCatalog::pickem();
    assert_eq!(guard.enforce(&as_host(&host), &catalog, elevated, recheck.clone()), GuardOutcome::Allowed);
    assert_eq!(
        guard.enforce(&as_host(&host), &catalog, Viewer::signed_in(true), recheck),
        GuardOutcome::Redirected
    );
}

#[test]
fn issued_redirect_is_not_repeated() {
    let host = FakeHost::on_page("picks");
    let guard = Guard::new("./index.html");
    let catalog = PageCatalog::pickem();
    let (_, recheck) = viewer_cell(Viewer::SIGNED_OUT);

    guard.enforce(&as_host(&host), &catalog, Viewer::SIGNED_OUT, recheck.clone());
    let outcome = guard.enforce(&as_host(&host), &catalog, Viewer::SIGNED_OUT, recheck);
    assert_eq!(outcome, GuardOutcome::Pending);
    assert_eq!(host.navigations.borrow().len(), 1);
}
