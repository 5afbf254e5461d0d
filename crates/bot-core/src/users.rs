//! Member lookup from free-form queries.

use crate::context::BotContext;
use crate::error::{BotError, BotResult};
use crate::member::Member;
use chat_client::{Gateway, UserId};
use std::sync::Arc;

/// Upper bound on candidates carried by an ambiguous-result error, so the
/// list fits the reply transport.
pub const MAX_AMBIGUOUS_CANDIDATES: usize = 8;

/// Resolve `query` to a member of `context`'s server.
///
/// Tries a raw id or `<@id>` mention first, then a case-insensitive name
/// prefix search over the roster. No match returns `None`; more than one
/// prefix match is [`BotError::AmbiguousUser`] with a bounded candidate list.
pub async fn find_member(
    gateway: &dyn Gateway,
    context: &Arc<BotContext>,
    query: &str,
) -> BotResult<Option<Member>> {
    if let Some(id) = UserId::from_query(query) {
        // A name that happens to be all digits falls through to the
        // name search when no such id is on the roster.
        if let Some(member) = member_by_id(gateway, context, id).await? {
            return Ok(Some(member));
        }
    }

    let roster = gateway.members_of(context.server_id()).await?;
    let query_lower = query.to_lowercase();
    let mut matches: Vec<_> = roster
        .into_iter()
        .filter(|user| user.name.to_lowercase().starts_with(&query_lower))
        .collect();

    match matches.len() {
        0 => Ok(None),
        1 => Ok(Some(Member::new(context.clone(), matches.remove(0)))),
        _ => {
            let mut candidates: Vec<String> = matches
                .iter()
                .map(|user| format!("{} (user id: {})", user.name, user.id))
                .collect();
            candidates.truncate(MAX_AMBIGUOUS_CANDIDATES);
            Err(BotError::AmbiguousUser {
                query: query.to_string(),
                candidates,
            })
        }
    }
}

/// Resolve `query` strictly as an id or mention. Names never match.
pub async fn find_member_by_id(
    gateway: &dyn Gateway,
    context: &Arc<BotContext>,
    query: &str,
) -> BotResult<Option<Member>> {
    match UserId::from_query(query) {
        Some(id) => member_by_id(gateway, context, id).await,
        None => Ok(None),
    }
}

async fn member_by_id(
    gateway: &dyn Gateway,
    context: &Arc<BotContext>,
    id: UserId,
) -> BotResult<Option<Member>> {
    let roster = gateway.members_of(context.server_id()).await?;
    Ok(roster
        .into_iter()
        .find(|user| user.id == id)
        .map(|user| Member::new(context.clone(), user)))
}
