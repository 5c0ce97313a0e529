use super::*;
use crate::request::{HttpMethod, MockHttpClient};
use crate::route::RecordingNavigator;
use crate::storage::MemoryStorage;
use serde_json::json;

const BASE: &str = "http://api.test/api";

// =========================================================
// Shared Test Fixtures
// =========================================================

struct Fixture {
    storage: MemoryStorage,
    navigator: Rc<RecordingNavigator>,
    session: SessionModule,
    api: Gateway<MockHttpClient>,
}

fn config() -> ClientConfig {
    ClientConfig::default().with_base_url(BASE)
}

fn fixture_with(storage: MemoryStorage) -> Fixture {
    let navigator = Rc::new(RecordingNavigator::default());
    let session = SessionModule::restore(
        config(),
        Rc::new(storage.clone()),
        Rc::new(storage.clone()),
        navigator.clone(),
    );
    Fixture {
        storage,
        navigator,
        session,
        api: Gateway::new(MockHttpClient::new(), BASE),
    }
}

fn fixture() -> Fixture {
    fixture_with(MemoryStorage::new())
}

fn url(path: &str) -> String {
    format!("{}{}", BASE, path)
}

fn alice(is_staff: bool) -> serde_json::Value {
    json!({
        "id": 7,
        "username": "alice",
        "email": "alice@example.com",
        "first_name": "Alice",
        "last_name": "L",
        "is_staff": is_staff,
        "is_active": true
    })
}

fn stored_profile(storage: &MemoryStorage) -> Option<String> {
    KeyValueStore::get(storage, "mm_dfd_user")
}

fn stored_token(storage: &MemoryStorage) -> Option<String> {
    CookieStore::get(storage, "mm_dfd_token")
}

// =========================================================
// Restore
// =========================================================

#[test]
fn test_restore_from_persisted_state() {
    let storage = MemoryStorage::new();
    CookieStore::set(&storage, "mm_dfd_token", "persisted", 7);
    KeyValueStore::set(&storage, "mm_dfd_user", &alice(true).to_string());

    let fx = fixture_with(storage);
    assert_eq!(fx.session.token().as_deref(), Some("persisted"));
    assert_eq!(fx.session.user().unwrap().username, "alice");
    assert_eq!(fx.session.roles(), vec![Role::User, Role::Admin]);
}

#[test]
fn test_malformed_profile_is_treated_as_empty() {
    let storage = MemoryStorage::new();
    KeyValueStore::set(&storage, "mm_dfd_user", "{not json");

    let fx = fixture_with(storage);
    assert_eq!(fx.session.user(), None);
    assert!(fx.session.roles().is_empty());

    let storage = MemoryStorage::new();
    KeyValueStore::set(&storage, "mm_dfd_user", "{}");
    let fx = fixture_with(storage);
    assert_eq!(fx.session.user(), None);
}

#[test]
fn test_empty_token_cookie_means_logged_out() {
    let storage = MemoryStorage::new();
    CookieStore::set(&storage, "mm_dfd_token", "", 7);

    let fx = fixture_with(storage);
    assert_eq!(fx.session.token(), None);
    assert!(!fx.session.access().has_token);
}

// =========================================================
// Login / Profile
// =========================================================

#[tokio::test]
async fn test_login_stores_token_and_cookie() {
    let fx = fixture();
    fx.api.client().mock_response(
        HttpMethod::Post,
        &url("/users/token/"),
        200,
        json!({ "access": "tok123" }),
    );

    fx.session.login(&fx.api, "alice", "secret").await.unwrap();

    assert_eq!(fx.session.state().token.as_deref(), Some("tok123"));
    assert_eq!(stored_token(&fx.storage).as_deref(), Some("tok123"));
    assert_eq!(fx.storage.cookie_expiry("mm_dfd_token"), Some(7));

    let sent = fx.api.client().last_request().unwrap();
    let body: serde_json::Value = serde_json::from_str(&sent.body_text()).unwrap();
    assert_eq!(body, json!({ "username": "alice", "password": "secret" }));
}

#[tokio::test]
async fn test_login_failure_leaves_state_untouched() {
    let fx = fixture();
    fx.api.client().mock_response(
        HttpMethod::Post,
        &url("/users/token/"),
        400,
        json!({ "detail": "No active account" }),
    );

    let err = fx.session.login(&fx.api, "alice", "wrong").await.unwrap_err();

    assert_eq!(err.status_code(), Some(400));
    assert_eq!(fx.session.token(), None);
    assert_eq!(stored_token(&fx.storage), None);
}

#[tokio::test]
async fn test_get_user_info_derives_roles_and_persists() {
    let fx = fixture();
    fx.api
        .client()
        .mock_response(HttpMethod::Get, &url("/users/me/"), 200, alice(true));

    let user = fx.session.get_user_info(&fx.api).await.unwrap();

    assert_eq!(user.id, 7);
    assert_eq!(fx.session.roles(), vec![Role::User, Role::Admin]);
    assert!(fx.session.state().is_admin());

    let persisted: UserProfile = serde_json::from_str(&stored_profile(&fx.storage).unwrap()).unwrap();
    assert_eq!(persisted, user);
}

#[tokio::test]
async fn test_roles_recomputed_from_latest_profile() {
    let fx = fixture();
    fx.api
        .client()
        .mock_response(HttpMethod::Get, &url("/users/me/"), 200, alice(true));
    fx.session.get_user_info(&fx.api).await.unwrap();
    assert!(fx.session.access().is_admin());

    fx.api
        .client()
        .mock_response(HttpMethod::Get, &url("/users/me/"), 200, alice(false));
    fx.session.get_user_info(&fx.api).await.unwrap();
    assert_eq!(fx.session.roles(), vec![Role::User]);
}

#[tokio::test]
async fn test_get_user_info_failure_rejects() {
    let fx = fixture();
    fx.api.client().mock_response(
        HttpMethod::Get,
        &url("/users/me/"),
        500,
        json!({ "detail": "oops" }),
    );

    assert!(fx.session.get_user_info(&fx.api).await.is_err());
    assert_eq!(fx.session.user(), None);
}

// =========================================================
// Register / Update / Password
// =========================================================

#[tokio::test]
async fn test_register_does_not_touch_session() {
    let fx = fixture();
    fx.api.client().mock_response(
        HttpMethod::Post,
        &url("/users/"),
        201,
        json!({ "username": "bob", "email": "bob@example.com", "first_name": "B", "last_name": "C" }),
    );

    let created = fx
        .session
        .register(
            &fx.api,
            &RegisterRequest {
                username: "bob".into(),
                email: "bob@example.com".into(),
                password: "pw12345!".into(),
                password2: "pw12345!".into(),
                first_name: "B".into(),
                last_name: "C".into(),
            },
        )
        .await
        .unwrap();

    assert_eq!(created.username, "bob");
    assert_eq!(fx.session.state(), SessionState::default());
}

#[tokio::test]
async fn test_update_user_info_merges_server_fields() {
    let fx = fixture();
    fx.api
        .client()
        .mock_response(HttpMethod::Get, &url("/users/me/"), 200, alice(false));
    fx.session.get_user_info(&fx.api).await.unwrap();

    fx.api.client().mock_response(
        HttpMethod::Patch,
        &url("/users/7/"),
        200,
        json!({ "id": 7, "username": "alice", "bio": "fact checker", "email": "server@example.com" }),
    );

    let merged = fx
        .session
        .update_user_info(
            &fx.api,
            &ProfilePatch {
                bio: Some("fact checker".into()),
                email: Some("local@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // 服务端字段优先，未返回的字段保留本地值
    assert_eq!(merged.email, "server@example.com");
    assert_eq!(merged.bio.as_deref(), Some("fact checker"));
    assert_eq!(merged.first_name, "Alice");
    assert_eq!(fx.session.user(), Some(merged.clone()));

    let persisted: UserProfile = serde_json::from_str(&stored_profile(&fx.storage).unwrap()).unwrap();
    assert_eq!(persisted, merged);
}

#[tokio::test]
async fn test_update_without_profile_rejects_locally() {
    let fx = fixture();

    let err = fx
        .session
        .update_user_info(&fx.api, &ProfilePatch::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidInput(_)));
    assert_eq!(fx.api.client().request_count(), 0);
}

#[tokio::test]
async fn test_change_password_keeps_state() {
    let fx = fixture();
    fx.api
        .client()
        .mock_response(HttpMethod::Get, &url("/users/me/"), 200, alice(false));
    fx.session.get_user_info(&fx.api).await.unwrap();
    let before = fx.session.state();

    fx.api.client().mock_response(
        HttpMethod::Post,
        &url("/users/7/change_password/"),
        200,
        json!({ "detail": "密码修改成功" }),
    );

    let change = PasswordChange {
        old_password: "old".into(),
        new_password: "new-pass-1".into(),
        new_password2: "new-pass-1".into(),
    };
    let resp = fx.session.change_password(&fx.api, &change).await.unwrap();

    assert_eq!(resp["detail"], "密码修改成功");
    assert_eq!(fx.session.state(), before);

    fx.api.client().mock_response(
        HttpMethod::Post,
        &url("/users/7/change_password/"),
        400,
        json!({ "old_password": "wrong" }),
    );
    let err = fx.session.change_password(&fx.api, &change).await.unwrap_err();
    assert_eq!(err.status_code(), Some(400));
}

// =========================================================
// Logout / Subscribers
// =========================================================

#[tokio::test]
async fn test_logout_clears_everything_and_is_idempotent() {
    let fx = fixture();
    fx.api.client().mock_response(
        HttpMethod::Post,
        &url("/users/token/"),
        200,
        json!({ "access": "tok123" }),
    );
    fx.api
        .client()
        .mock_response(HttpMethod::Get, &url("/users/me/"), 200, alice(true));
    fx.session.login(&fx.api, "alice", "secret").await.unwrap();
    fx.session.get_user_info(&fx.api).await.unwrap();

    fx.session.logout();
    assert_eq!(fx.session.state(), SessionState::default());
    assert!(fx.session.roles().is_empty());
    assert_eq!(stored_token(&fx.storage), None);
    assert_eq!(stored_profile(&fx.storage), None);

    fx.session.logout();
    assert_eq!(fx.session.state(), SessionState::default());
    assert_eq!(
        *fx.navigator.visits.borrow(),
        vec!["/login".to_string(), "/login".to_string()]
    );
}

#[test]
fn test_clear_does_not_navigate() {
    let fx = fixture();
    fx.session.commit(SessionMutation::SetToken(Some("t".into())));
    fx.session.clear();
    assert_eq!(fx.session.token(), None);
    assert!(fx.navigator.visits.borrow().is_empty());
}

#[test]
fn test_subscribers_see_every_commit() {
    let fx = fixture();
    let seen: Rc<RefCell<Vec<bool>>> = Rc::default();
    let sink = seen.clone();
    fx.session
        .subscribe(move |state| sink.borrow_mut().push(state.has_token()));

    fx.session.commit(SessionMutation::SetToken(Some("t".into())));
    fx.session.logout();

    // SetToken(Some) -> Clear
    assert_eq!(*seen.borrow(), vec![true, false]);
}

#[tokio::test]
async fn test_teardown_is_a_single_notification() {
    let fx = fixture();
    fx.api
        .client()
        .mock_response(HttpMethod::Get, &url("/users/me/"), 200, alice(true));
    fx.session.commit(SessionMutation::SetToken(Some("t".into())));
    fx.session.get_user_info(&fx.api).await.unwrap();

    let seen: Rc<RefCell<Vec<SessionState>>> = Rc::default();
    let sink = seen.clone();
    fx.session
        .subscribe(move |state| sink.borrow_mut().push(state.clone()));

    fx.session.clear();

    // 不会出现 "token 已清空但资料仍在" 的中间状态
    assert_eq!(*seen.borrow(), vec![SessionState::default()]);
}
