use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;

use crate::client::{UserPoolClient, UserPoolConfig};
use crate::error::codes;
use crate::flow::{AuthFlow, AuthMode};
use crate::types::SignInOutcome;

fn client_for(server: &ServerGuard) -> UserPoolClient {
    UserPoolClient::new(
        UserPoolConfig::new("eu-west-1", "eu-west-1_Pool", "client-1")
            .with_endpoint(server.url()),
    )
}

fn tokens_body() -> String {
    json!({
        "AuthenticationResult": {
            "IdToken": "id.jwt",
            "AccessToken": "access.jwt",
            "RefreshToken": "refresh.jwt",
            "ExpiresIn": 3600
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_sign_up_sends_target_header_and_parses_outcome() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/x-amz-json-1.1")
        .match_header("x-amz-target", "AWSCognitoIdentityProviderService.SignUp")
        .match_body(Matcher::PartialJson(json!({
            "ClientId": "client-1",
            "Username": "alice@example.com",
            "UserAttributes": [{"Name": "email", "Value": "alice@example.com"}]
        })))
        .with_status(200)
        .with_body(r#"{"UserSub":"sub-123","UserConfirmed":false}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let outcome = client
        .sign_up("alice@example.com", "hunter2hunter2")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(outcome.user_sub, "sub-123");
    assert!(!outcome.confirmed);
}

#[tokio::test]
async fn test_sign_in_returns_tokens() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("x-amz-target", "AWSCognitoIdentityProviderService.InitiateAuth")
        .match_body(Matcher::PartialJson(json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "AuthParameters": {"USERNAME": "alice@example.com", "PASSWORD": "pw"}
        })))
        .with_status(200)
        .with_body(tokens_body())
        .create_async()
        .await;

    let client = client_for(&server);
    let outcome = client.sign_in("alice@example.com", "pw").await.unwrap();

    mock.assert_async().await;
    match outcome {
        SignInOutcome::Tokens(tokens) => {
            assert_eq!(tokens.id_token, "id.jwt");
            assert_eq!(tokens.refresh_token.as_deref(), Some("refresh.jwt"));
        }
        other => panic!("expected tokens, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sign_in_surfaces_new_password_challenge() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(200)
        .with_body(r#"{"ChallengeName":"NEW_PASSWORD_REQUIRED","Session":"sess-9"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let outcome = client.sign_in("alice", "pw").await.unwrap();
    assert_eq!(
        outcome,
        SignInOutcome::NewPasswordRequired {
            session: "sess-9".to_string()
        }
    );
}

#[tokio::test]
async fn test_error_code_namespace_prefix_is_stripped() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .with_status(400)
        .with_body(
            r#"{"__type":"com.amazonaws.cognito#NotAuthorizedException","message":"Incorrect username or password."}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.sign_in("alice", "wrong").await.unwrap_err();
    assert_eq!(err.code(), Some(codes::NOT_AUTHORIZED));
    assert_eq!(
        err.friendly_message(),
        "Invalid credentials or account not verified"
    );
}

#[tokio::test]
async fn test_respond_new_password_returns_tokens() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header(
            "x-amz-target",
            "AWSCognitoIdentityProviderService.RespondToAuthChallenge",
        )
        .match_body(Matcher::PartialJson(json!({
            "ChallengeName": "NEW_PASSWORD_REQUIRED",
            "Session": "sess-9",
            "ChallengeResponses": {"USERNAME": "alice", "NEW_PASSWORD": "n3wpassw0rd"}
        })))
        .with_status(200)
        .with_body(tokens_body())
        .create_async()
        .await;

    let client = client_for(&server);
    let tokens = client
        .respond_new_password("alice", "n3wpassw0rd", "sess-9")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(tokens.access_token, "access.jwt");
}

#[tokio::test]
async fn test_get_user_extracts_email_attribute() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("x-amz-target", "AWSCognitoIdentityProviderService.GetUser")
        .match_body(Matcher::PartialJson(json!({"AccessToken": "access.jwt"})))
        .with_status(200)
        .with_body(
            r#"{"Username":"alice","UserAttributes":[{"Name":"sub","Value":"s"},{"Name":"email","Value":"alice@example.com"}]}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let profile = client.get_user("access.jwt").await.unwrap();

    mock.assert_async().await;
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.email.as_deref(), Some("alice@example.com"));
}

#[tokio::test]
async fn test_expired_verification_code_triggers_automatic_resend() {
    let mut server = Server::new_async().await;
    let confirm = server
        .mock("POST", "/")
        .match_header(
            "x-amz-target",
            "AWSCognitoIdentityProviderService.ConfirmSignUp",
        )
        .with_status(400)
        .with_body(r#"{"__type":"ExpiredCodeException","message":"Code has expired."}"#)
        .create_async()
        .await;
    let resend = server
        .mock("POST", "/")
        .match_header(
            "x-amz-target",
            "AWSCognitoIdentityProviderService.ResendConfirmationCode",
        )
        .match_body(Matcher::PartialJson(json!({"Username": "alice@example.com"})))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let mut flow = AuthFlow::new();
    flow.note_sign_in(
        "alice@example.com",
        "pw",
        &Err(crate::error::AuthError::service(
            codes::USER_NOT_CONFIRMED,
            "not confirmed",
        )),
    );
    assert_eq!(flow.mode(), AuthMode::Verify);

    let signed_in = flow.submit_verify(&client, "000000").await;

    confirm.assert_async().await;
    resend.assert_async().await;
    assert!(signed_in.is_none());
    assert_eq!(flow.mode(), AuthMode::Verify);
}

#[tokio::test]
async fn test_verify_success_auto_signs_in() {
    let mut server = Server::new_async().await;
    let confirm = server
        .mock("POST", "/")
        .match_header(
            "x-amz-target",
            "AWSCognitoIdentityProviderService.ConfirmSignUp",
        )
        .match_body(Matcher::PartialJson(json!({
            "Username": "alice@example.com",
            "ConfirmationCode": "123456"
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let sign_in = server
        .mock("POST", "/")
        .match_header(
            "x-amz-target",
            "AWSCognitoIdentityProviderService.InitiateAuth",
        )
        .with_status(200)
        .with_body(tokens_body())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let mut flow = AuthFlow::new();
    let outcome = Ok(crate::types::SignUpOutcome {
        user_sub: "sub-1".to_string(),
        confirmed: false,
    });
    flow.note_sign_up("alice@example.com", "pw", &outcome);

    let tokens = flow.submit_verify(&client, "123456").await;

    confirm.assert_async().await;
    sign_in.assert_async().await;
    assert_eq!(tokens.unwrap().id_token, "id.jwt");
}
