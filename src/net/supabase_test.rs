use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::block_on;
use navsync::{AuthEvent, MemoryStore};

use super::*;
use crate::net::config::ProviderSources;

fn configured() -> ProviderConfig {
    ProviderConfig::resolve(&ProviderSources {
        meta_url: Some("https://pickem.supabase.co".into()),
        meta_key: Some("anon".into()),
        ..ProviderSources::default()
    })
}

#[test]
fn endpoints_hang_off_project_url() {
    assert_eq!(user_endpoint("https://p.supabase.co"), "https://p.supabase.co/auth/v1/user");
    assert_eq!(logout_endpoint("https://p.supabase.co"), "https://p.supabase.co/auth/v1/logout");
    assert_eq!(bearer("tok"), "Bearer tok");
}

#[test]
fn commissioner_endpoint_filters_by_user() {
    assert_eq!(
        commissioner_endpoint("https://p.supabase.co", "8f14e45f-ceea-467f-a0e6-8f5b5e0c0b1a").as_deref(),
        Some("https://p.supabase.co/rest/v1/teams?select=commissioner&user_id=eq.8f14e45f-ceea-467f-a0e6-8f5b5e0c0b1a")
    );
    assert_eq!(commissioner_endpoint("https://p.supabase.co", "a&b=c"), None);
    assert_eq!(commissioner_endpoint("https://p.supabase.co", ""), None);
}

#[test]
fn token_status_separates_rejection_from_failure() {
    assert!(matches!(token_status(200), Ok(true)));
    assert!(matches!(token_status(401), Ok(false)));
    assert!(matches!(token_status(403), Ok(false)));
    assert!(matches!(token_status(500), Err(AuthError::Status(500))));
}

#[test]
fn live_session_skips_expired_and_unreadable_slots() {
    let store = MemoryStore::new();
    assert_eq!(live_session(&store, "auth", 100), None);

    store.set("auth", "garbage").expect("set");
    assert_eq!(live_session(&store, "auth", 100), None);

    store.set("auth", r#"{"access_token":"t","expires_at":100,"user":{"id":"u"}}"#).expect("set");
    assert_eq!(live_session(&store, "auth", 100), None);
    let live = live_session(&store, "auth", 99).expect("live");
    assert_eq!(live.user_id(), Some("u"));
}

#[test]
fn unconfigured_provider_is_an_error() {
    let auth = SupabaseAuth::new(ProviderConfig::default());
    let result = block_on(auth.get_session());
    assert!(matches!(result, Err(AuthError::NotConfigured(_))));
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn reads_are_published_once_per_change() {
    let auth = SupabaseAuth::new(configured());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _sub = auth.on_change(Rc::new(move |event: AuthEvent, _session: Option<Session>| {
        sink.borrow_mut().push(event);
    }));

    assert_eq!(block_on(auth.get_session()).expect("session"), None);
    assert_eq!(block_on(auth.get_session()).expect("session"), None);
    block_on(auth.sign_out()).expect("sign out");
    assert_eq!(*seen.borrow(), vec![AuthEvent::InitialSession]);
}

#[test]
fn dropping_subscription_removes_handler() {
    let auth = SupabaseAuth::new(configured());
    let sub = auth.on_change(Rc::new(|_: AuthEvent, _: Option<Session>| {}));
    assert_eq!(auth.handler_count(), 1);
    drop(sub);
    assert_eq!(auth.handler_count(), 0);
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn role_lookup_without_a_token_is_not_elevated() {
    let roles = CommissionerLookup::new(configured());
    let elevated = block_on(roles.is_elevated(&Session::new("u-1"))).expect("lookup");
    assert!(!elevated);
}
