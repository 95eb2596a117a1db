use crate::selectors::NEXT_PAGE;
use crate::session::{PageElement, PageSession, SessionError, SessionResult};
use std::time::Duration;

/// Moves the session to the next listing page.
///
/// `Ok(false)` means there is no clickable "next" control left, which is
/// how the end of the listing shows itself.
pub async fn advance<S: PageSession>(
    session: &S,
    timeout: Duration,
    settle: Duration,
) -> SessionResult<bool> {
    match click_next(session, timeout, settle).await {
        Ok(()) => Ok(true),
        Err(
            SessionError::Timeout | SessionError::StaleElement | SessionError::NoSuchElement(_),
        ) => {
            ::log::debug!("No clickable next-page control");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

async fn click_next<S: PageSession>(
    session: &S,
    timeout: Duration,
    settle: Duration,
) -> SessionResult<()> {
    let next_button = session.wait_for_clickable(NEXT_PAGE, timeout).await?;
    session.scroll_into_view(&next_button).await?;
    tokio::time::sleep(settle).await;
    next_button.click().await
}
