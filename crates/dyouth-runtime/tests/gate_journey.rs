//! End-to-end journeys through the gate with the in-memory backend.
//!
//! Each test drives a `Navigator` the way a browser session would:
//! anonymous visit, sign in, profile setup, gated pages, sign out.

use dyouth_auth::{AccessGate, ViewerState};
use dyouth_runtime::backend::memory::MemoryBackend;
use dyouth_runtime::config::ProfileConfig;
use dyouth_runtime::session::{ProviderError, StoreError};
use dyouth_runtime::{
    AvatarUpload, NavigationOutcome, Navigator, ProfileForm, ProfileUpsert, SessionContext,
    SessionResolver, ViewState,
};
use dyouth_types::{ErrorCode, ProfileRecord, UserId};
use std::sync::Arc;
use std::time::Duration;

struct Site {
    backend: Arc<MemoryBackend>,
    gate: Arc<AccessGate>,
    navigator: Navigator,
    profiles: ProfileUpsert,
}

fn site(ttl: Duration) -> Site {
    let backend = Arc::new(MemoryBackend::new());
    let gate = Arc::new(AccessGate::site_default());
    let session = Arc::new(SessionContext::new(
        SessionResolver::new(backend.clone(), backend.clone()),
        ttl,
    ));
    let navigator = Navigator::new(gate.clone(), session);
    let profiles = ProfileUpsert::new(backend.clone(), backend.clone(), ProfileConfig::default());
    Site {
        backend,
        gate,
        navigator,
        profiles,
    }
}

fn uid(s: &str) -> UserId {
    UserId::new(s).unwrap()
}

fn render(path: &str) -> NavigationOutcome {
    NavigationOutcome::Render { path: path.into() }
}

fn redirect(from: &str, to: &str) -> NavigationOutcome {
    NavigationOutcome::Redirect {
        from: from.into(),
        to: to.into(),
    }
}

#[tokio::test]
async fn new_member_journey() {
    let site = site(Duration::from_secs(60));
    let nav = &site.navigator;

    // anonymous
    assert_eq!(nav.navigate("/").await, render("/"));
    assert_eq!(nav.navigate("/walls").await, redirect("/walls", "/login"));
    assert_eq!(nav.navigate("/login").await, render("/login"));

    // sign in without a profile
    let token = site.backend.issue_token(uid("u-1"));
    let landing = nav.session().sign_in_callback(token, &site.gate).await;
    assert_eq!(landing, "/setup-profile");

    assert_eq!(nav.navigate("/login").await, render("/login"));
    assert_eq!(nav.navigate("/family").await, redirect("/family", "/setup-profile"));
    assert_eq!(nav.navigate("/setup-profile").await, render("/setup-profile"));

    // complete the profile
    let form = ProfileForm::new(uid("u-1"), "Jane")
        .with_cohort("2567", "Chiang Mai")
        .with_avatar(AvatarUpload::new("me.png", "image/png", vec![7; 32]));
    let saved = site
        .profiles
        .submit_for(form, nav.session())
        .await
        .unwrap();
    assert!(saved.is_complete());
    let key = saved.avatar_url.rsplit('/').next().unwrap();
    assert!(key.starts_with("u-1-") && key.ends_with(".png"));
    assert_eq!(site.backend.object(key), Some(vec![7; 32]));

    assert_eq!(nav.navigate("/family").await, render("/family"));
    assert_eq!(nav.navigate("/setup-profile").await, render("/setup-profile"));

    // sign out
    nav.session().sign_out().await.unwrap();
    assert_eq!(nav.navigate("/family").await, redirect("/family", "/login"));
    assert_eq!(
        nav.view(),
        ViewState::Redirected {
            from: "/family".into(),
            to: "/login".into(),
        }
    );
}

#[tokio::test]
async fn returning_member_lands_home() {
    let site = site(Duration::ZERO);
    site.backend
        .put_profile(ProfileRecord::empty(uid("u-2")).with_display_name("Somchai"));
    let token = site.backend.issue_token(uid("u-2"));

    let landing = site
        .navigator
        .session()
        .sign_in_callback(token, &site.gate)
        .await;

    assert_eq!(landing, "/");
    assert_eq!(
        site.navigator.navigate("/message/u-9").await,
        render("/message/u-9")
    );
}

#[tokio::test]
async fn expired_token_is_anonymous() {
    let site = site(Duration::ZERO);
    let token = site.backend.issue_token(uid("u-3"));
    site.navigator
        .session()
        .sign_in_callback(token.clone(), &site.gate)
        .await;

    site.backend.revoke(&token);

    assert_eq!(
        site.navigator.navigate("/profile").await,
        redirect("/profile", "/login")
    );
    assert!(site.navigator.banner().is_none());
}

#[tokio::test]
async fn outage_keeps_current_page_and_recovers() {
    let site = site(Duration::ZERO);
    let token = site.backend.issue_token(uid("u-4"));
    site.navigator
        .session()
        .sign_in_callback(token, &site.gate)
        .await;
    assert_eq!(
        site.navigator.navigate("/setup-profile").await,
        render("/setup-profile")
    );

    site.backend
        .fail_profile_reads(Some(StoreError::unavailable("connection reset")));
    let outcome = site.navigator.navigate("/family").await;

    assert!(
        matches!(outcome, NavigationOutcome::Stand { ref path, .. } if path == "/setup-profile")
    );
    let banner = site.navigator.banner().unwrap();
    assert_eq!(banner.code, "PROFILE_LOOKUP_FAILED");

    site.backend.fail_profile_reads(None);
    assert_eq!(
        site.navigator.navigate("/family").await,
        redirect("/family", "/setup-profile")
    );
    assert!(site.navigator.banner().is_none());
}

#[tokio::test]
async fn completed_member_rides_out_store_outage() {
    let site = site(Duration::ZERO);
    site.backend
        .put_profile(ProfileRecord::empty(uid("u-7")).with_display_name("Nok"));
    let token = site.backend.issue_token(uid("u-7"));
    site.navigator
        .session()
        .sign_in_callback(token, &site.gate)
        .await;

    site.backend
        .fail_profile_reads(Some(StoreError::unavailable("connection reset")));

    assert_eq!(site.navigator.navigate("/wall").await, render("/wall"));
}

#[tokio::test]
async fn identity_outage_does_not_redirect_to_login() {
    let site = site(Duration::ZERO);
    let token = site.backend.issue_token(uid("u-5"));
    site.navigator
        .session()
        .sign_in_callback(token, &site.gate)
        .await;

    site.backend
        .fail_identity(Some(ProviderError::unavailable("auth down")));
    let outcome = site.navigator.navigate("/walls").await;

    assert_ne!(outcome, redirect("/walls", "/login"));
    assert_eq!(site.navigator.banner().unwrap().code, "AUTH_SERVICE_UNAVAILABLE");
    assert_eq!(
        site.navigator.session().current().await.viewer().state(),
        None
    );
}

#[tokio::test]
async fn member_cannot_overwrite_someone_elses_profile() {
    let site = site(Duration::ZERO);
    site.backend
        .put_profile(ProfileRecord::empty(uid("u-8")).with_display_name("Pim"));
    let token = site.backend.issue_token(uid("u-9"));
    let session = site.navigator.session();
    session.sign_in_callback(token, &site.gate).await;

    let err = site
        .profiles
        .submit_for(ProfileForm::new(uid("u-8"), "Changed"), session)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "PROFILE_NOT_OWNER");
    assert_eq!(
        site.backend.profile(&uid("u-8")).unwrap().display_name,
        "Pim"
    );
}

#[tokio::test]
async fn cached_completion_survives_store_lag() {
    let site = site(Duration::ZERO);
    let token = site.backend.issue_token(uid("u-6"));
    let session = site.navigator.session();
    session.sign_in_callback(token, &site.gate).await;

    site.profiles
        .submit_for(ProfileForm::new(uid("u-6"), "Dao"), session)
        .await
        .unwrap();

    // a lagging replica briefly reports no profile
    site.backend.put_profile(ProfileRecord::empty(uid("u-6")));

    assert_eq!(
        session.current().await.viewer().state(),
        Some(ViewerState::AuthComplete)
    );
    assert_eq!(site.navigator.navigate("/wall").await, render("/wall"));
}
