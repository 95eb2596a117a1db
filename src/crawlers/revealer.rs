use crate::config::RevealOptions;
use crate::selectors::{PAGE_HEIGHT_SCRIPT, SCROLL_TO_BOTTOM_SCRIPT, SETTLE_SCROLL_SCRIPT};
use crate::session::{PageSession, SessionError, SessionResult};
use rand::Rng;
use tokio::time::sleep;

/// Scrolls to the bottom until the page stops growing, so lazily loaded
/// listing entries are in the DOM before harvesting.
///
/// Returns the number of scrolls performed.
pub async fn reveal<S: PageSession>(session: &S, options: &RevealOptions) -> SessionResult<usize> {
    let mut last_height = page_height(session).await?;
    let mut scrolls = 0;

    loop {
        if let Some(max) = options.max_scrolls {
            if scrolls >= max {
                ::log::warn!(
                    "Page still growing after {} scrolls (height {}), giving up",
                    scrolls,
                    last_height
                );
                return Ok(scrolls);
            }
        }

        session.execute(SCROLL_TO_BOTTOM_SCRIPT, Vec::new()).await?;
        scrolls += 1;
        sleep(options.pause()).await;

        let new_height = page_height(session).await?;
        if new_height == last_height {
            break;
        }
        ::log::trace!("Page grew from {} to {}", last_height, new_height);
        last_height = new_height;

        if should_settle(options.settle_probability) {
            session.execute(SETTLE_SCROLL_SCRIPT, Vec::new()).await?;
            sleep(options.settle_pause()).await;
        }
    }

    ::log::debug!(
        "Page fully revealed after {} scrolls (height {})",
        scrolls,
        last_height
    );
    Ok(scrolls)
}

fn should_settle(probability: f64) -> bool {
    probability > 0.0 && rand::rng().random_bool(probability.min(1.0))
}

async fn page_height<S: PageSession>(session: &S) -> SessionResult<i64> {
    let value = session.execute(PAGE_HEIGHT_SCRIPT, Vec::new()).await?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|h| h as i64))
        .ok_or_else(|| SessionError::UnexpectedScriptResult(format!("page height {}", value)))
}
