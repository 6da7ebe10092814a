//! End-to-end turn resolution: webhook delivery to published continuation.

mod common;

use axum::http::StatusCode;
use common::{PAGE_ID, RelayHarness};
use tale_core::{DEFAULT_SYSTEM_PROMPT, MovePolicy};
use tale_llm::Message;
use tale_test::{ChangeBuilder, MockPlatform};

const POST: &str = "*** PART 1 ***\n\nA fork in the road.\n1. Left\n2. Right";

fn page() -> MockPlatform {
    MockPlatform::new(PAGE_ID).with_post("page_1", POST)
}

#[tokio::test]
async fn root_comment_continues_the_story() {
    let h = RelayHarness::builder(page().with_comment("page_1_c1", "page_1", "ada", "2"))
        .replies(&["You walk right into a forest."])
        .build();

    let status = h
        .deliver(&[ChangeBuilder::root_comment("page_1", "page_1_c1", "ada", "2")])
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        h.llm.captured_messages(),
        vec![vec![Message::assistant(POST), Message::user("2")]]
    );
    assert_eq!(h.llm.captured_systems(), vec![DEFAULT_SYSTEM_PROMPT.to_string()]);

    let published = h.page.published_comments();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].target_id, "page_1_c1");
    assert_eq!(
        published[0].text,
        "*** PART 2 ***\n\nYou walk right into a forest.\n\n*** Add a reply with the number of your choice. ***"
    );
}

#[tokio::test]
async fn reply_rebuilds_the_thread_oldest_first() {
    let h = RelayHarness::builder(
        page()
            .with_comment("c1", "page_1", "ada", "1")
            .with_comment("c2", "c1", PAGE_ID, "*** PART 2 ***\n\nA river.\n1. Swim\n2. Wait")
            .with_comment("c3", "c1", "bob", "3 is better")
            .with_comment("c4", "c1", "ada", "2"),
    )
    .replies(&["You wait by the river."])
    .build();

    h.deliver(&[ChangeBuilder::reply("page_1", "c1", "c4", "ada", "2")])
        .await;

    assert_eq!(
        h.llm.captured_messages()[0],
        vec![
            Message::assistant(POST),
            Message::user("1"),
            Message::assistant("*** PART 2 ***\n\nA river.\n1. Swim\n2. Wait"),
            Message::user("2"),
        ]
    );
    let published = h.page.published_comments();
    assert_eq!(published[0].target_id, "c1");
    assert!(published[0].text.starts_with("*** PART 3 ***"));
}

#[tokio::test]
async fn conversation_carries_across_turns() {
    let h = RelayHarness::builder(page().with_comment("c1", "page_1", "ada", "1"))
        .replies(&["Part two text", "Part three text"])
        .build();

    h.deliver(&[ChangeBuilder::root_comment("page_1", "c1", "ada", "1")])
        .await;
    h.page.add_comment("c9", "c1", Some("ada"), "I choose 2!");
    h.deliver(&[ChangeBuilder::reply("page_1", "c1", "c9", "ada", "I choose 2!")])
        .await;

    let calls = h.llm.captured_messages();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].len(), 4);
    assert!(calls[1][2].content.starts_with("*** PART 2 ***\n\nPart two text"));
    assert_eq!(calls[1][3], Message::user("2"));

    let published = h.page.published_comments();
    assert_eq!(published.len(), 2);
    assert!(published[1].text.starts_with("*** PART 3 ***"));
    assert!(published.iter().all(|p| p.target_id == "c1"));
}

#[tokio::test]
async fn reply_from_another_player_is_rejected() {
    let h = RelayHarness::builder(page().with_comment("c1", "page_1", "ada", "1"))
        .replies(&["unused"])
        .build();

    h.deliver(&[ChangeBuilder::reply("page_1", "c1", "c2", "bob", "2")])
        .await;

    assert_eq!(h.llm.call_count(), 0);
    assert!(h.page.published().is_empty());
}

#[tokio::test]
async fn thread_with_hidden_authors_still_continues() {
    let h = RelayHarness::builder(page()).replies(&["You swim across."]).build();
    h.page.add_comment("c1", "page_1", None, "1");
    h.page
        .add_comment("c2", "c1", Some(PAGE_ID), "*** PART 2 ***\n\nA river.\n1. Swim\n2. Wait");
    h.page.add_comment("c3", "c1", None, "1");

    h.deliver(&[ChangeBuilder::reply("page_1", "c1", "c3", "ada", "1")])
        .await;

    assert_eq!(
        h.llm.captured_messages()[0],
        vec![
            Message::assistant(POST),
            Message::user("1"),
            Message::assistant("*** PART 2 ***\n\nA river.\n1. Swim\n2. Wait"),
            Message::user("1"),
        ]
    );
    assert_eq!(h.page.published_comments()[0].target_id, "c1");
}

#[tokio::test]
async fn page_comments_and_edits_are_ignored() {
    let h = RelayHarness::builder(page()).replies(&["unused"]).build();

    h.deliver(&[
        ChangeBuilder::root_comment("page_1", "c1", PAGE_ID, "1"),
        ChangeBuilder::root_comment("page_1", "c2", "ada", "1").verb("edited"),
        ChangeBuilder::root_comment("page_1", "c3", "ada", "1").without_author(),
    ])
    .await;

    assert_eq!(h.llm.call_count(), 0);
    assert!(h.page.published().is_empty());
}

#[tokio::test]
async fn comment_without_a_number_is_dropped() {
    let h = RelayHarness::builder(page()).replies(&["unused"]).build();

    h.deliver(&[ChangeBuilder::root_comment("page_1", "c1", "ada", "What a story!")])
        .await;

    assert_eq!(h.llm.call_count(), 0);
    assert!(h.page.calls().is_empty());
}

#[tokio::test]
async fn strict_policy_needs_a_bare_number() {
    let h = RelayHarness::builder(page())
        .replies(&["Onward"])
        .policy(MovePolicy::Strict)
        .build();

    h.deliver(&[ChangeBuilder::root_comment("page_1", "c1", "ada", "I pick 2")])
        .await;
    assert_eq!(h.llm.call_count(), 0);

    h.deliver(&[ChangeBuilder::root_comment("page_1", "c2", "ada", " 2 ")])
        .await;
    assert_eq!(h.llm.call_count(), 1);
    assert_eq!(h.llm.captured_messages()[0][1], Message::user("2"));
}

#[tokio::test]
async fn model_failure_publishes_nothing() {
    let h = RelayHarness::builder(page()).build();

    let status = h
        .deliver(&[ChangeBuilder::root_comment("page_1", "c1", "ada", "1")])
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.llm.call_count(), 1);
    assert!(h.page.published().is_empty());
}

#[tokio::test]
async fn deleted_story_post_is_skipped() {
    let h = RelayHarness::builder(MockPlatform::new(PAGE_ID))
        .replies(&["unused"])
        .build();

    h.deliver(&[ChangeBuilder::root_comment("page_gone", "c1", "ada", "1")])
        .await;

    assert_eq!(h.llm.call_count(), 0);
    assert_eq!(h.page.calls(), vec!["fetch_post:page_gone".to_string()]);
}
