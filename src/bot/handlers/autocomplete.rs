//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions are scoped to the caller: only groups they belong to and
//! invites addressed to them are offered.

use crate::{
    bot::BotData,
    core::{group, user},
    errors::Error,
};

/// Discord accepts at most this many suggestions.
const MAX_SUGGESTIONS: usize = 25;

fn matching_names(names: impl Iterator<Item = String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = names
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(MAX_SUGGESTIONS)
        .collect();
    matching.sort();
    matching
}

/// Suggests the names of groups the caller created or has joined.
pub async fn autocomplete_group_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(Some(caller)) = user::find_user_by_discord_id(db, &ctx.author().id.to_string()).await
    else {
        return Vec::new();
    };
    let Ok(groups) = group::list_groups_for_user(db, caller.id).await else {
        return Vec::new();
    };

    matching_names(groups.into_iter().map(|g| g.name), partial)
}

/// Suggests the names of groups the caller has a pending invite to.
pub async fn autocomplete_pending_invite(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;

    let Ok(Some(caller)) = user::find_user_by_discord_id(db, &ctx.author().id.to_string()).await
    else {
        return Vec::new();
    };
    let Ok(invites) = group::list_pending_invites(db, caller.id).await else {
        return Vec::new();
    };

    matching_names(invites.into_iter().map(|(_, g)| g.name), partial)
}

/// Suggests the supported split types.
#[must_use]
pub async fn autocomplete_split_type(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching_names(
        ["equal", "percentage", "custom"].into_iter().map(str::to_string),
        partial,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_names_filters_and_sorts() {
        let names = ["Trip", "Flat", "trip to Porto"].map(str::to_string);
        assert_eq!(
            matching_names(names.into_iter(), "TRIP"),
            vec!["Trip".to_string(), "trip to Porto".to_string()]
        );
    }

    #[test]
    fn test_matching_names_limits_suggestions() {
        let names = (0..40).map(|i| format!("group {i}"));
        assert_eq!(matching_names(names, "").len(), MAX_SUGGESTIONS);
    }
}
