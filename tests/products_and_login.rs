mod common;

use cart_api::{
    error::AppError,
    services::{auth_service, product_service},
};
use common::{hash_password, test_app};

#[tokio::test]
async fn search_is_case_insensitive_substring() -> anyhow::Result<()> {
    let app = test_app();
    let mug = app.store.insert_product("Ferris Mug", 1200).await;
    let hoodie = app.store.insert_product("Ferris Hoodie", 5500).await;
    app.store.insert_product("Sticker Pack", 500).await;

    let body = product_service::search_products(&app.state, "ferris").await?;
    let ids: Vec<i64> = body.products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![mug.id, hoodie.id]);
    Ok(())
}

#[tokio::test]
async fn search_without_match_is_not_found() {
    let app = test_app();
    app.store.insert_product("Ferris Mug", 1200).await;

    let err = product_service::search_products(&app.state, "teapot")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "No products like this"));
}

#[tokio::test]
async fn list_returns_whole_catalog() -> anyhow::Result<()> {
    let app = test_app();
    app.store.insert_product("Ferris Mug", 1200).await;
    app.store.insert_product("Sticker Pack", 500).await;

    let body = product_service::list_products(&app.state).await?;
    assert_eq!(body.products.len(), 2);
    Ok(())
}

#[tokio::test]
async fn lookup_by_id() -> anyhow::Result<()> {
    let app = test_app();
    let mug = app.store.insert_product("Ferris Mug", 1200).await;

    let body = product_service::get_product(&app.state, mug.id).await?;
    assert_eq!(body.product, mug);

    let err = product_service::get_product(&app.state, mug.id + 100)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "No products like this"));
    Ok(())
}

#[test]
fn login_without_identity_is_missing_credentials() {
    let err = auth_service::login(None).unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated(ref msg) if msg == "missing credentials"));
}

#[tokio::test]
async fn login_returns_identifier_and_token() -> anyhow::Result<()> {
    let app = test_app();
    app.store
        .insert_user("ferris@example.com", &hash_password("crab-rave"))
        .await;

    let identity = auth_service::authenticate(
        app.state.users.as_ref(),
        &app.state.tokens,
        "ferris@example.com",
        "crab-rave",
    )
    .await?
    .expect("credentials resolve to a user");

    let body = auth_service::login(Some(&identity))?;
    assert_eq!(body.user, "ferris@example.com");
    assert_eq!(body.token, identity.token);

    let claims = app.state.tokens.verify(&body.token).expect("valid token");
    assert_eq!(claims.email, "ferris@example.com");
    Ok(())
}

#[tokio::test]
async fn wrong_password_or_unknown_user_resolves_nothing() -> anyhow::Result<()> {
    let app = test_app();
    app.store
        .insert_user("ferris@example.com", &hash_password("crab-rave"))
        .await;

    let wrong = auth_service::authenticate(
        app.state.users.as_ref(),
        &app.state.tokens,
        "ferris@example.com",
        "nope",
    )
    .await?;
    assert!(wrong.is_none());

    let unknown = auth_service::authenticate(
        app.state.users.as_ref(),
        &app.state.tokens,
        "corro@example.com",
        "crab-rave",
    )
    .await?;
    assert!(unknown.is_none());
    Ok(())
}
