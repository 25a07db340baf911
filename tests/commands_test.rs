//! Integration tests for /start, /status and the admin commands
//!
//! Run with: cargo test --test commands_test

mod common;

use common::*;
use pinoy_gate::telegram::flow::{self, handle_join_request};
use pinoy_gate::telegram::{ReplyKeyboard, Requester};
use pretty_assertions::assert_eq;

const MARIA: i64 = 602;

fn last_text(env: &TestEnvironment, chat: i64) -> String {
    env.gateway.messages_to(chat).pop().expect("a message").0
}

#[tokio::test]
async fn start_offers_contact_button_to_new_users() {
    let env = TestEnvironment::new();
    flow::start(&env.gateway, &env.verifier, &user(MARIA, "Maria")).await.unwrap();

    let (text, keyboard) = env.gateway.messages_to(MARIA).pop().unwrap();
    assert!(text.contains("Hi Maria!"));
    assert!(matches!(keyboard, ReplyKeyboard::RequestContact(_)));
}

#[tokio::test]
async fn start_tells_verified_users_they_are_done() {
    let env = TestEnvironment::new();
    let maria = user(MARIA, "Maria");
    env.verifier.verify_contact(&maria.profile(), "+639181112222").unwrap();

    flow::start(&env.gateway, &env.verifier, &maria).await.unwrap();

    let (text, keyboard) = env.gateway.messages_to(MARIA).pop().unwrap();
    assert!(text.contains("already verified"));
    assert_eq!(keyboard, ReplyKeyboard::Remove);
}

#[tokio::test]
async fn status_reports_each_state() {
    let env = TestEnvironment::with_sqlite();
    let maria = user(MARIA, "Maria");

    flow::status(&env.gateway, &env.verifier, &maria).await.unwrap();
    assert!(last_text(&env, MARIA).contains("NOT VERIFIED"));

    env.verifier.verify_contact(&maria.profile(), "09181112222").unwrap();
    flow::status(&env.gateway, &env.verifier, &maria).await.unwrap();
    let text = last_text(&env, MARIA);
    assert!(text.contains("VERIFIED"));
    assert!(text.contains("+63 918 111 2222"));

    env.verifier.store().ban(MARIA, Some(ADMIN_ID)).unwrap();
    flow::status(&env.gateway, &env.verifier, &maria).await.unwrap();
    assert!(last_text(&env, MARIA).contains("BANNED"));
}

#[tokio::test]
async fn status_sent_from_a_group_is_answered_privately() {
    let env = TestEnvironment::new();
    let maria = user(MARIA, "Maria");
    env.verifier.verify_contact(&maria.profile(), "+639181112222").unwrap();
    let in_group = Requester {
        dm_chat_id: GROUP_CHAT,
        ..maria
    };

    flow::status(&env.gateway, &env.verifier, &in_group).await.unwrap();

    assert!(env.gateway.messages_to(GROUP_CHAT).is_empty());
    assert!(last_text(&env, MARIA).contains("+63 918 111 2222"));
}

#[tokio::test]
async fn start_sent_from_a_group_offers_the_button_privately() {
    let env = TestEnvironment::new();
    let in_group = Requester {
        dm_chat_id: GROUP_CHAT,
        ..user(MARIA, "Maria")
    };

    flow::start(&env.gateway, &env.verifier, &in_group).await.unwrap();

    assert!(env.gateway.messages_to(GROUP_CHAT).is_empty());
    let (_, keyboard) = env.gateway.messages_to(MARIA).pop().unwrap();
    assert!(matches!(keyboard, ReplyKeyboard::RequestContact(_)));
}

#[tokio::test]
async fn admin_commands_are_refused_for_regular_users() {
    let env = TestEnvironment::new();
    let maria = user(MARIA, "Maria");

    flow::ban(&env.gateway, &env.verifier, &env.settings, &maria, 42).await.unwrap();
    flow::unban(&env.gateway, &env.verifier, &env.settings, &maria, 42).await.unwrap();
    flow::stats(&env.gateway, &env.verifier, &env.settings, &maria).await.unwrap();

    let replies = env.gateway.messages_to(MARIA);
    assert_eq!(replies.len(), 3);
    assert!(replies.iter().all(|(text, _)| text.contains("only available to admins")));
    assert!(!env.verifier.store().is_banned(42).unwrap());
}

#[tokio::test]
async fn ban_declines_pending_requests_and_blocks_future_ones() {
    let env = TestEnvironment::new();
    let maria = user(MARIA, "Maria");
    handle_join_request(&env.gateway, &env.verifier, &env.settings, &join_request(MARIA, GROUP_CHAT), &maria)
        .await
        .unwrap();

    flow::ban(&env.gateway, &env.verifier, &env.settings, &admin(), MARIA).await.unwrap();
    assert_eq!(env.gateway.declines(), vec![(GROUP_CHAT, MARIA)]);
    assert!(last_text(&env, ADMIN_ID).contains("1 pending request(s) declined"));

    flow::ban(&env.gateway, &env.verifier, &env.settings, &admin(), MARIA).await.unwrap();
    assert!(last_text(&env, ADMIN_ID).contains("already banned"));

    let decision = handle_join_request(
        &env.gateway,
        &env.verifier,
        &env.settings,
        &join_request(MARIA, OTHER_GROUP_CHAT),
        &maria,
    )
    .await
    .unwrap();
    assert_eq!(decision, pinoy_gate::Decision::Block);
}

#[tokio::test]
async fn ban_leaves_request_pending_when_decline_fails() {
    let env = TestEnvironment::new();
    let maria = user(MARIA, "Maria");
    handle_join_request(&env.gateway, &env.verifier, &env.settings, &join_request(MARIA, GROUP_CHAT), &maria)
        .await
        .unwrap();
    env.gateway.fail_declines_in(GROUP_CHAT);

    flow::ban(&env.gateway, &env.verifier, &env.settings, &admin(), MARIA).await.unwrap();

    assert!(env.verifier.store().is_banned(MARIA).unwrap());
    assert_eq!(env.verifier.store().pending_requests(MARIA).unwrap().len(), 1);
    assert!(last_text(&env, ADMIN_ID).contains("0 pending request(s) declined"));
}

#[tokio::test]
async fn unban_restores_previous_verification() {
    let env = TestEnvironment::new();
    let maria = user(MARIA, "Maria");
    env.verifier.verify_contact(&maria.profile(), "+639181112222").unwrap();
    env.verifier.store().ban(MARIA, Some(ADMIN_ID)).unwrap();

    flow::unban(&env.gateway, &env.verifier, &env.settings, &admin(), MARIA).await.unwrap();
    assert!(last_text(&env, ADMIN_ID).contains("unbanned"));
    assert_eq!(
        env.verifier.store().verified_phone(MARIA).unwrap().as_deref(),
        Some("+639181112222")
    );

    flow::unban(&env.gateway, &env.verifier, &env.settings, &admin(), MARIA).await.unwrap();
    assert!(last_text(&env, ADMIN_ID).contains("is not banned"));
}

#[tokio::test]
async fn stats_counts_users_and_requests() {
    let env = TestEnvironment::with_sqlite();
    let maria = user(MARIA, "Maria");
    handle_join_request(&env.gateway, &env.verifier, &env.settings, &join_request(MARIA, GROUP_CHAT), &maria)
        .await
        .unwrap();
    env.verifier.store().ban(77, Some(ADMIN_ID)).unwrap();

    flow::stats(&env.gateway, &env.verifier, &env.settings, &admin()).await.unwrap();

    let text = last_text(&env, ADMIN_ID);
    assert!(text.contains("<b>Verified users:</b> 0"));
    assert!(text.contains("<b>Banned users:</b> 1"));
    assert!(text.contains("pending: 1"));
}
