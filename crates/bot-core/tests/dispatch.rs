//! End-to-end dispatch tests driven through the in-process gateway.

use async_trait::async_trait;
use bot_core::perms::{LEVEL_ADMINISTRATOR, LEVEL_OPERATOR, LEVEL_STANDARD};
use bot_core::{
    Bot, BotContext, BotError, BotResult, Command, Dispatch, Invocation, Member, PassiveHandler,
    Rejection,
};
use chat_client::{ChannelId, ChatMessage, ChatUser, MemoryGateway, ServerId, UserId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const SERVER: ServerId = ServerId(10);
const CHANNEL: ChannelId = ChannelId(20);

const BOT: UserId = UserId(1);
const ALICE: UserId = UserId(2); // standard user
const OLIVIA: UserId = UserId(3); // operator
const NATE: UserId = UserId(4); // one level below operator
const AMY: UserId = UserId(5); // administrator

struct Harness {
    gateway: Arc<MemoryGateway>,
    bot: Arc<Bot>,
    handler_b_ran: Arc<AtomicBool>,
    _dir: TempDir,
}

/// Replies with its split arguments joined by `|`.
struct InspectCommand;

#[async_trait]
impl Command for InspectCommand {
    fn name(&self) -> &str {
        "inspect"
    }

    fn description(&self) -> &str {
        "Echoes its parsed arguments."
    }

    fn syntax(&self) -> String {
        format!("{} [args...]", self.name())
    }

    fn required_level(&self) -> u8 {
        LEVEL_STANDARD
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        invocation.respond(&invocation.args.join("|")).await
    }
}

/// Global command with aliases, echoing the raw tail.
struct EchoCommand;

#[async_trait]
impl Command for EchoCommand {
    fn name(&self) -> &str {
        "echo"
    }

    fn aliases(&self) -> &[&str] {
        &["say", "repeat"]
    }

    fn description(&self) -> &str {
        "Repeats the text after the command name."
    }

    fn syntax(&self) -> String {
        format!("{} <text>", self.name())
    }

    fn required_level(&self) -> u8 {
        LEVEL_STANDARD
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        invocation.respond(invocation.arg_tail).await
    }
}

/// Operator-gated command.
struct OpsCommand;

#[async_trait]
impl Command for OpsCommand {
    fn name(&self) -> &str {
        "ops"
    }

    fn description(&self) -> &str {
        "Does something operators do."
    }

    fn syntax(&self) -> String {
        self.name().to_string()
    }

    fn required_level(&self) -> u8 {
        LEVEL_OPERATOR
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        invocation.respond("ops ran").await
    }
}

/// Usable only in one channel; redirects everywhere else.
struct BotChannelOnly;

const BOT_CHANNEL: ChannelId = ChannelId(99);

#[async_trait]
impl Command for BotChannelOnly {
    fn name(&self) -> &str {
        "botchannel"
    }

    fn description(&self) -> &str {
        "Only answers in the bot channel."
    }

    fn syntax(&self) -> String {
        self.name().to_string()
    }

    fn required_level(&self) -> u8 {
        LEVEL_STANDARD
    }

    fn channel_check(&self, message: &ChatMessage) -> bot_core::ChannelCheck {
        if message.channel_id == BOT_CHANNEL {
            bot_core::ChannelCheck::Allowed
        } else {
            bot_core::ChannelCheck::Redirect(BOT_CHANNEL)
        }
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        invocation.respond("in the right place").await
    }
}

/// Context-specific command that shadows the stock `help`.
struct ShadowHelp;

#[async_trait]
impl Command for ShadowHelp {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "Context-local replacement for help."
    }

    fn syntax(&self) -> String {
        self.name().to_string()
    }

    fn required_level(&self) -> u8 {
        LEVEL_STANDARD
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        invocation.respond("shadowed help").await
    }
}

/// Always reports cancellation.
struct CancelledCommand;

#[async_trait]
impl Command for CancelledCommand {
    fn name(&self) -> &str {
        "cancelme"
    }

    fn description(&self) -> &str {
        "Pretends its surrounding operation was aborted."
    }

    fn syntax(&self) -> String {
        self.name().to_string()
    }

    fn required_level(&self) -> u8 {
        LEVEL_STANDARD
    }

    async fn execute(&self, _invocation: &Invocation<'_>) -> BotResult<()> {
        Err(BotError::Cancelled)
    }
}

/// Consumes messages containing "magic"; sorted before `beta` by name.
struct AlphaHandler;

#[async_trait]
impl PassiveHandler for AlphaHandler {
    fn name(&self) -> &str {
        "alpha"
    }

    fn description(&self) -> &str {
        "Consumes messages containing the word magic."
    }

    async fn run(
        &self,
        _context: &Arc<BotContext>,
        _member: &Member,
        message: &ChatMessage,
    ) -> BotResult<bool> {
        Ok(message.content.contains("magic"))
    }
}

/// Records that it ran; never consumes.
struct BetaHandler {
    ran: Arc<AtomicBool>,
}

#[async_trait]
impl PassiveHandler for BetaHandler {
    fn name(&self) -> &str {
        "beta"
    }

    fn description(&self) -> &str {
        "Observes messages without consuming them."
    }

    async fn run(
        &self,
        _context: &Arc<BotContext>,
        _member: &Member,
        _message: &ChatMessage,
    ) -> BotResult<bool> {
        self.ran.store(true, Ordering::SeqCst);
        Ok(false)
    }
}

async fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let gateway = Arc::new(MemoryGateway::new(ChatUser {
        id: BOT,
        name: "archon".into(),
        is_bot: true,
    }));
    gateway.add_member(SERVER, ChatUser::new(BOT, "archon"));
    gateway.add_member(SERVER, ChatUser::new(ALICE, "alice"));
    gateway.add_member(SERVER, ChatUser::new(OLIVIA, "olivia"));
    gateway.add_member(SERVER, ChatUser::new(NATE, "nate"));
    gateway.add_member(SERVER, ChatUser::new(AMY, "amy"));

    let handler_b_ran = Arc::new(AtomicBool::new(false));
    let context = BotContext::builder("Test Server", SERVER)
        .command(Arc::new(InspectCommand))
        .command(Arc::new(OpsCommand))
        .command(Arc::new(ShadowHelp))
        .command(Arc::new(BotChannelOnly))
        .handler(Arc::new(AlphaHandler))
        .handler(Arc::new(BetaHandler {
            ran: handler_b_ran.clone(),
        }))
        .build();

    let bot = Bot::builder(gateway.clone(), dir.path())
        .context(context)
        .command(Arc::new(EchoCommand))
        .command(Arc::new(CancelledCommand))
        .build();

    let context = bot.contexts().get(SERVER);
    for (user, level) in [
        (OLIVIA, LEVEL_OPERATOR),
        (NATE, LEVEL_OPERATOR - 1),
        (AMY, LEVEL_ADMINISTRATOR),
    ] {
        bot.perms()
            .set_level(&context, user, level, true)
            .await
            .unwrap();
    }

    Harness {
        gateway,
        bot,
        handler_b_ran,
        _dir: dir,
    }
}

fn message_from(author_id: UserId, name: &str, content: &str) -> ChatMessage {
    ChatMessage {
        author: ChatUser::new(author_id, name),
        server_id: Some(SERVER),
        channel_id: CHANNEL,
        content: content.into(),
        timestamp: 0,
    }
}

#[tokio::test]
async fn test_prefix_classification() {
    let h = harness().await;

    assert!(h.bot.is_command(">>help"));
    assert!(h.bot.is_command(">> help"));
    assert!(!h.bot.is_command("help"));
    // Text no longer than the prefix is never a command.
    assert!(!h.bot.is_command(">>"));
    assert!(!h.bot.is_command(">"));
}

#[tokio::test]
async fn test_command_with_space_after_prefix() {
    let h = harness().await;

    let outcome = h
        .bot
        .dispatch_message(&message_from(ALICE, "alice", ">> echo hello"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Completed {
            command: "echo".into()
        }
    );
    assert_eq!(h.gateway.last_sent(), Some("hello".into()));
}

#[tokio::test]
async fn test_space_after_prefix_rejected_when_disallowed() {
    let dir = TempDir::new().unwrap();
    let gateway = Arc::new(MemoryGateway::new(ChatUser {
        id: BOT,
        name: "archon".into(),
        is_bot: true,
    }));
    let bot = Bot::builder(gateway.clone(), dir.path())
        .allow_space_after_prefix(false)
        .context(BotContext::builder("Test Server", SERVER).build())
        .build();

    let outcome = bot
        .dispatch_message(&message_from(ALICE, "alice", ">> help"))
        .await
        .unwrap();
    // Falls through to the passive path instead of resolving a command.
    assert_eq!(outcome, Dispatch::Unhandled);
}

#[tokio::test]
async fn test_case_insensitive_resolution() {
    let h = harness().await;

    for content in [">>ECHO hi", ">>Echo hi", ">>echo hi"] {
        let outcome = h
            .bot
            .dispatch_message(&message_from(ALICE, "alice", content))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Dispatch::Completed {
                command: "echo".into()
            }
        );
    }
}

#[tokio::test]
async fn test_alias_resolves_to_canonical_command() {
    let h = harness().await;

    let outcome = h
        .bot
        .dispatch_message(&message_from(ALICE, "alice", ">>SAY round trip"))
        .await
        .unwrap();
    // The alias executes the same command the canonical name does.
    assert_eq!(
        outcome,
        Dispatch::Completed {
            command: "echo".into()
        }
    );
    assert_eq!(h.gateway.last_sent(), Some("round trip".into()));
}

#[tokio::test]
async fn test_quoted_arguments_group() {
    let h = harness().await;

    h.bot
        .dispatch_message(&message_from(ALICE, "alice", ">>inspect foo \"bar baz\" 123"))
        .await
        .unwrap();
    assert_eq!(h.gateway.last_sent(), Some("foo|bar baz|123".into()));
}

#[tokio::test]
async fn test_context_command_shadows_global() {
    let h = harness().await;

    let outcome = h
        .bot
        .dispatch_message(&message_from(ALICE, "alice", ">>help"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Completed {
            command: "help".into()
        }
    );
    assert_eq!(h.gateway.last_sent(), Some("shadowed help".into()));
}

#[tokio::test]
async fn test_format_code_stripped_from_name() {
    let h = harness().await;

    // Formatting control characters cannot spoof or hide a command name.
    let outcome = h
        .bot
        .dispatch_message(&message_from(ALICE, "alice", ">>ec§ho smuggled"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Completed {
            command: "echo".into()
        }
    );
}

#[tokio::test]
async fn test_unknown_command_rejected() {
    let h = harness().await;

    let outcome = h
        .bot
        .dispatch_message(&message_from(ALICE, "alice", ">>nosuch"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Rejected(Rejection::UnknownCommand {
            name: "nosuch".into()
        })
    );
    assert_eq!(
        h.gateway.last_sent(),
        Some("The command `nosuch` does not exist.".into())
    );
}

#[tokio::test]
async fn test_overlong_command_name_rejected() {
    let h = harness().await;

    let content = format!(">>{}", "x".repeat(33));
    let outcome = h
        .bot
        .dispatch_message(&message_from(ALICE, "alice", &content))
        .await
        .unwrap();
    assert_eq!(outcome, Dispatch::Rejected(Rejection::NameTooLong));
}

#[tokio::test]
async fn test_permission_boundary_names_both_levels() {
    let h = harness().await;

    // One level short: rejected, with both levels in the reply.
    let outcome = h
        .bot
        .dispatch_message(&message_from(NATE, "nate", ">>ops"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Rejected(Rejection::Unauthorized {
            command: "ops".into(),
            required: 63,
            actual: 62,
        })
    );
    let reply = h.gateway.last_sent().unwrap();
    assert!(reply.contains("63"));
    assert!(reply.contains("62"));

    // At the required level: allowed.
    let outcome = h
        .bot
        .dispatch_message(&message_from(OLIVIA, "olivia", ">>ops"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Completed {
            command: "ops".into()
        }
    );
}

#[tokio::test]
async fn test_wrong_channel_suggests_alternative() {
    let h = harness().await;

    let outcome = h
        .bot
        .dispatch_message(&message_from(ALICE, "alice", ">>botchannel"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Rejected(Rejection::WrongChannel {
            command: "botchannel".into(),
            suggested: BOT_CHANNEL,
        })
    );
    assert!(h.gateway.last_sent().unwrap().contains("<#99>"));

    let mut message = message_from(ALICE, "alice", ">>botchannel");
    message.channel_id = BOT_CHANNEL;
    let outcome = h.bot.dispatch_message(&message).await.unwrap();
    assert_eq!(
        outcome,
        Dispatch::Completed {
            command: "botchannel".into()
        }
    );
}

#[tokio::test]
async fn test_passive_handler_consumption_stops_iteration() {
    let h = harness().await;

    let outcome = h
        .bot
        .dispatch_message(&message_from(ALICE, "alice", "some magic words"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Handled {
            handler: "alpha".into()
        }
    );
    // alpha consumed the message, so beta never saw it.
    assert!(!h.handler_b_ran.load(Ordering::SeqCst));

    let outcome = h
        .bot
        .dispatch_message(&message_from(ALICE, "alice", "ordinary words"))
        .await
        .unwrap();
    assert_eq!(outcome, Dispatch::Unhandled);
    assert!(h.handler_b_ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_fallback_context_skips_passive_handlers() {
    let h = harness().await;

    let mut message = message_from(ALICE, "alice", "just chatting");
    message.server_id = Some(ServerId(999));
    let outcome = h.bot.dispatch_message(&message).await.unwrap();
    assert_eq!(outcome, Dispatch::Skipped);

    // Global commands still work from a fallback context.
    let mut message = message_from(ALICE, "alice", ">>echo from nowhere");
    message.server_id = Some(ServerId(999));
    let outcome = h.bot.dispatch_message(&message).await.unwrap();
    assert_eq!(
        outcome,
        Dispatch::Completed {
            command: "echo".into()
        }
    );
}

#[tokio::test]
async fn test_console_ignores_context_commands() {
    let h = harness().await;

    // The console resolves `help` from the global registry, not the
    // context's shadow, so nothing goes out through the gateway.
    let outcome = h.bot.dispatch_console("help").await.unwrap();
    assert_eq!(
        outcome,
        Dispatch::Completed {
            command: "help".into()
        }
    );
    assert!(h.gateway.sent().is_empty());

    // Context-specific commands do not exist from the console.
    let outcome = h.bot.dispatch_console("inspect anything").await.unwrap();
    assert_eq!(
        outcome,
        Dispatch::Rejected(Rejection::UnknownCommand {
            name: "inspect".into()
        })
    );
}

#[tokio::test]
async fn test_console_context_commands_refuse_gracefully() {
    let h = harness().await;

    let outcome = h.bot.dispatch_console("config list").await.unwrap();
    match outcome {
        Dispatch::Rejected(Rejection::CommandError { command, message }) => {
            assert_eq!(command, "config");
            assert!(message.contains("not available from the console"));
        }
        other => panic!("expected a command error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancelled_execution_is_silent() {
    let h = harness().await;

    let outcome = h
        .bot
        .dispatch_message(&message_from(ALICE, "alice", ">>cancelme"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Aborted {
            name: "cancelme".into()
        }
    );
    // No user-facing failure is produced.
    assert!(h.gateway.sent().is_empty());
}

#[tokio::test]
async fn test_config_command_round_trip() {
    let h = harness().await;

    let outcome = h
        .bot
        .dispatch_message(&message_from(OLIVIA, "olivia", ">>config set greeting hello"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Completed {
            command: "config".into()
        }
    );

    h.bot
        .dispatch_message(&message_from(OLIVIA, "olivia", ">>config get greeting"))
        .await
        .unwrap();
    assert!(h.gateway.last_sent().unwrap().contains("[greeting]=hello"));

    h.bot
        .dispatch_message(&message_from(OLIVIA, "olivia", ">>config list"))
        .await
        .unwrap();
    assert!(h.gateway.last_sent().unwrap().contains("[greeting]=hello"));

    h.bot
        .dispatch_message(&message_from(OLIVIA, "olivia", ">>config remove greeting"))
        .await
        .unwrap();
    assert!(h.gateway.last_sent().unwrap().contains("Removed"));

    h.bot
        .dispatch_message(&message_from(OLIVIA, "olivia", ">>config get greeting"))
        .await
        .unwrap();
    assert!(h.gateway.last_sent().unwrap().contains("does not exist"));
}

#[tokio::test]
async fn test_config_denied_below_operator() {
    let h = harness().await;

    let outcome = h
        .bot
        .dispatch_message(&message_from(ALICE, "alice", ">>config list"))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        Dispatch::Rejected(Rejection::Unauthorized { .. })
    ));
}

#[tokio::test]
async fn test_getperms_and_setperms_flow() {
    let h = harness().await;

    h.bot
        .dispatch_message(&message_from(ALICE, "alice", ">>getperms"))
        .await
        .unwrap();
    assert_eq!(
        h.gateway.last_sent(),
        Some("Your permission level is `2`".into())
    );

    let outcome = h
        .bot
        .dispatch_message(&message_from(OLIVIA, "olivia", ">>setperms 2 3"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Completed {
            command: "setperms".into()
        }
    );

    h.bot
        .dispatch_message(&message_from(OLIVIA, "olivia", ">>getperms alice"))
        .await
        .unwrap();
    assert_eq!(
        h.gateway.last_sent(),
        Some("The permission level of `alice` is `3`".into())
    );
}

#[tokio::test]
async fn test_setperms_rank_guards() {
    let h = harness().await;

    // Below the required level entirely.
    let outcome = h
        .bot
        .dispatch_message(&message_from(ALICE, "alice", ">>setperms 4 3"))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        Dispatch::Rejected(Rejection::Unauthorized { .. })
    ));

    // Cannot grant a level at or above your own.
    let outcome = h
        .bot
        .dispatch_message(&message_from(OLIVIA, "olivia", ">>setperms 2 100"))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        Dispatch::Rejected(Rejection::CommandError { .. })
    ));

    // Cannot edit a peer or superior.
    let outcome = h
        .bot
        .dispatch_message(&message_from(OLIVIA, "olivia", ">>setperms 5 2"))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        Dispatch::Rejected(Rejection::CommandError { .. })
    ));

    // Cannot edit yourself.
    let outcome = h
        .bot
        .dispatch_message(&message_from(OLIVIA, "olivia", ">>setperms 3 2"))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        Dispatch::Rejected(Rejection::CommandError { .. })
    ));
}

#[tokio::test]
async fn test_bot_account_level_is_immutable() {
    let h = harness().await;
    let context = h.bot.contexts().get(SERVER);

    h.bot
        .dispatch_message(&message_from(AMY, "amy", ">>getperms <@1>"))
        .await
        .unwrap();
    assert_eq!(
        h.gateway.last_sent(),
        Some("The permission level of `archon` is `255`".into())
    );

    // Even forceperms cannot move it.
    let outcome = h
        .bot
        .dispatch_message(&message_from(AMY, "amy", ">>archoncmd forceperms 1 0"))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        Dispatch::Rejected(Rejection::CommandError { .. })
    ));
    assert_eq!(h.bot.perms().level(&context, BOT).await.unwrap(), 255);
}

#[tokio::test]
async fn test_archon_nested_dispatch() {
    let h = harness().await;

    let outcome = h
        .bot
        .dispatch_message(&message_from(AMY, "amy", ">>archoncmd help"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Completed {
            command: "archoncmd".into()
        }
    );
    assert!(h.gateway.last_sent().unwrap().contains("currentcontext"));

    h.bot
        .dispatch_message(&message_from(AMY, "amy", ">>archoncmd currentcontext"))
        .await
        .unwrap();
    assert!(h.gateway.last_sent().unwrap().contains("Test Server"));

    let outcome = h
        .bot
        .dispatch_message(&message_from(AMY, "amy", ">>archoncmd nosuch"))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        Dispatch::Rejected(Rejection::CommandError { .. })
    ));
}

#[tokio::test]
async fn test_ambiguous_user_lists_candidates() {
    let h = harness().await;
    // Two names sharing a prefix with "a": alice and amy (and archon).
    h.bot
        .dispatch_message(&message_from(OLIVIA, "olivia", ">>getperms a"))
        .await
        .unwrap();
    let reply = h.gateway.last_sent().unwrap();
    assert!(reply.contains("More than one member matched"));
    assert!(reply.contains("alice"));
    assert!(reply.contains("amy"));
}

#[tokio::test]
async fn test_shutdown_command_signals_host() {
    let h = harness().await;

    let outcome = h
        .bot
        .dispatch_message(&message_from(AMY, "amy", ">>shutdown"))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Dispatch::Completed {
            command: "shutdown".into()
        }
    );
    assert!(h.bot.shutdown().is_requested());
    assert_eq!(
        h.gateway.last_sent(),
        Some("Sending shutdown signal and shutting down...".into())
    );
}

#[tokio::test]
async fn test_direct_message_resolves_no_context() {
    let h = harness().await;

    let mut message = message_from(ALICE, "alice", ">>echo dm");
    message.server_id = None;
    let outcome = h.bot.dispatch_message(&message).await.unwrap();
    assert_eq!(outcome, Dispatch::Skipped);
}

#[tokio::test]
async fn test_listhandlers_lists_sorted_names() {
    let h = harness().await;

    h.bot
        .dispatch_message(&message_from(ALICE, "alice", ">>listhandlers"))
        .await
        .unwrap();
    let reply = h.gateway.last_sent().unwrap();
    let alpha = reply.find("alpha").unwrap();
    let beta = reply.find("beta").unwrap();
    assert!(alpha < beta);

    h.bot
        .dispatch_message(&message_from(ALICE, "alice", ">>listhandlers beta"))
        .await
        .unwrap();
    assert!(h.gateway.last_sent().unwrap().contains("Observes messages"));
}
