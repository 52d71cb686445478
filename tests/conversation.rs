//! Conversation state integration tests
//!
//! Drives turns against the container directly, the way the chat client
//! does, so no network is involved.

use chrono::NaiveDate;
use confab::{ChatClient, Command, Conversation, Persona, Repl, Role};
use secrecy::SecretString;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
}

/// Play one successful exchange through the container
fn exchange(conversation: &mut Conversation, query: &str, reply: &str) {
    let request = conversation.begin_turn("gpt-3.5-turbo", query);
    conversation.complete_turn(request, reply, serde_json::json!({"id": "chatcmpl-test"}));
}

#[test]
fn hello_new_exit_scenario() {
    let mut conversation = Conversation::new(Persona::Default, today());

    // "Hello" is an ordinary query
    let Command::Query(query) = Command::parse("Hello") else {
        panic!("plain text should be a query");
    };
    exchange(&mut conversation, &query, "Hi! How can I help?");

    let roles: Vec<Role> = conversation.context().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    assert_eq!(conversation.history().len(), 1);

    // "new" resets to a single system message
    assert_eq!(Command::parse("new"), Command::Reset);
    conversation.reset(Persona::Default, today());
    assert_eq!(conversation.context().len(), 1);
    assert_eq!(conversation.context()[0].role, Role::System);
    assert!(conversation.history().is_empty());

    // "exit" terminates without touching the driver
    assert_eq!(Command::parse("exit"), Command::Terminate);
}

#[test]
fn context_grows_by_two_per_exchange() {
    let mut conversation = Conversation::new(Persona::Helpful, today());

    for (i, query) in ["first", "second", "third"].iter().enumerate() {
        exchange(&mut conversation, query, "reply");
        assert_eq!(conversation.context().len(), 1 + 2 * (i + 1));
        assert_eq!(conversation.history().len(), i + 1);
    }
}

#[test]
fn reset_from_any_state_yields_one_system_message() {
    let mut conversation = Conversation::new(Persona::Default, today());
    exchange(&mut conversation, "a", "b");
    exchange(&mut conversation, "c", "d");

    conversation.reset(Persona::Laconic, today());

    assert_eq!(conversation.context().len(), 1);
    assert_eq!(conversation.context()[0].role, Role::System);
    assert!(conversation.context()[0].content.contains("laconic"));
    assert!(conversation.history().is_empty());
}

#[test]
fn history_records_the_request_as_sent() {
    let mut conversation = Conversation::new(Persona::Default, today());
    exchange(&mut conversation, "what is rust?", "a language");

    let entry = &conversation.history()[0];
    assert_eq!(entry.request.model, "gpt-3.5-turbo");
    // The recorded request holds system + user, not the assistant reply
    assert_eq!(entry.request.messages.len(), 2);
    assert_eq!(entry.request.messages[1].content, "what is rust?");
    assert_eq!(entry.response["id"], "chatcmpl-test");
}

#[tokio::test]
async fn repl_starts_with_a_seeded_conversation() {
    let chat = ChatClient::new(
        SecretString::from("sk-test".to_string()),
        "gpt-3.5-turbo".to_string(),
    );
    let repl = Repl::new(chat, None, Persona::Laconic);

    let context = repl.conversation().context();
    assert_eq!(context.len(), 1);
    assert_eq!(context[0].role, Role::System);
    assert!(context[0].content.contains("laconic"));
    assert!(repl.conversation().history().is_empty());
}

#[test]
fn failed_turn_leaves_no_trace() {
    let mut conversation = Conversation::new(Persona::Default, today());
    exchange(&mut conversation, "a", "b");

    // Begin a turn, then abort it as the client does on a service error
    let _ = conversation.begin_turn("gpt-3.5-turbo", "doomed");
    conversation.abort_turn();

    assert_eq!(conversation.context().len(), 3);
    assert_eq!(conversation.history().len(), 1);
}
