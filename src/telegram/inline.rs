//! Inline-mode contact search
//!
//! Search-as-you-type over the caller's contacts. Each match renders as an
//! article card; choosing one fires a chosen-inline-result event that
//! triggers the same call-initiation side effect as a direct contact pick.

use teloxide::prelude::*;
use teloxide::types::{
    ChosenInlineResult, InlineQuery, InlineQueryResult, InlineQueryResultArticle, InputMessageContent,
    InputMessageContentText, ParseMode,
};
use teloxide::utils::html;

use crate::i18n;
use crate::storage::db;
use crate::storage::get_connection;
use crate::telegram::calls;
use crate::telegram::handlers::{HandlerDeps, HandlerError};
use crate::telegram::Bot;

/// Inline result id carrying the contact to call.
pub(crate) fn contact_result_id(contact_id: i64) -> String {
    format!("contact:{}", contact_id)
}

/// Decodes a `contact:<id>` result id. Foreign ids yield `None`.
pub(crate) fn parse_contact_result_id(result_id: &str) -> Option<i64> {
    result_id.strip_prefix("contact:")?.parse::<i64>().ok()
}

/// Handles an inline search query over the caller's contacts.
pub async fn handle_inline_query(bot: Bot, iq: InlineQuery, deps: HandlerDeps) -> Result<(), HandlerError> {
    let owner_id = i64::try_from(iq.from.id.0).unwrap_or(0);
    let lang = i18n::lang_from_telegram(iq.from.language_code.as_deref());
    let query = iq.query.trim().to_string();

    if query.is_empty() {
        bot.answer_inline_query(iq.id, Vec::<InlineQueryResult>::new())
            .cache_time(1)
            .is_personal(true)
            .await?;
        return Ok(());
    }

    let matches = {
        let conn = get_connection(&deps.db_pool)?;
        db::search_contacts(&conn, owner_id, &query)?
    };

    let results: Vec<InlineQueryResult> = matches
        .iter()
        .map(|entry| {
            let mut content = InputMessageContentText::new(html::bold(&html::escape(&entry.username)));
            content.parse_mode = Some(ParseMode::Html);

            let mut article = InlineQueryResultArticle::new(
                contact_result_id(entry.telegram_id),
                entry.username.clone(),
                InputMessageContent::Text(content),
            );
            article.description = Some(i18n::t(&lang, "inline.start_call_description"));
            InlineQueryResult::Article(article)
        })
        .collect();

    bot.answer_inline_query(iq.id, results)
        .cache_time(1)
        .is_personal(true)
        .await?;
    Ok(())
}

/// Handles a chosen inline result: starts the call to the picked contact.
///
/// Result ids that did not come from this bot's inline search are ignored.
pub async fn handle_chosen_inline_result(
    bot: Bot,
    chosen: ChosenInlineResult,
    deps: HandlerDeps,
) -> Result<(), HandlerError> {
    let Some(target_id) = parse_contact_result_id(&chosen.result_id) else {
        return Ok(());
    };
    let initiator_id = i64::try_from(chosen.from.id.0).unwrap_or(0);
    let lang = i18n::lang_from_telegram(chosen.from.language_code.as_deref());

    calls::start_call(&bot, &deps.db_pool, &lang, initiator_id, target_id).await?;
    Ok(())
}
